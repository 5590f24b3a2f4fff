pub mod gesture;
pub mod transfer;

pub use gesture::{GestureEvent, GestureStateMachine, GestureTuning};
pub use transfer::TransferClient;
