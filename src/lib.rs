//! PinchDrop Library
//!
//! 隔空抓取：捏合手势抓起屏幕截图，在另一台设备上松手取回

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod message;
pub mod utils;

// 重新导出常用类型
pub use application::{GestureStateMachine, GestureTuning, TransferClient};
pub use config::Setting;
pub use domain::{DeviceId, GestureState, TransferPayload};
pub use infrastructure::clipboard::ClipboardStore;
pub use infrastructure::web::{ConnectionRegistry, MessageHandler, WebServer};
pub use message::WsMessage;
