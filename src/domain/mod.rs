pub mod device;
pub mod gesture;
pub mod landmark;
pub mod payload;

pub use device::DeviceId;
pub use gesture::{GestureState, PinchMeasurement};
pub use landmark::{HandFrame, Point};
pub use payload::TransferPayload;
