//! 手势领域类型

use std::fmt::{self, Display};
use std::time::Instant;

/// 手势状态
///
/// 每个设备任一时刻只有一个值，初始为 Idle，仅由状态机变更
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Holding,
}

impl Display for GestureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureState::Idle => write!(f, "IDLE"),
            GestureState::Holding => write!(f, "HOLDING"),
        }
    }
}

/// 单帧的捏合距离测量值
///
/// 每处理一帧产生一次，立即被状态机消费
#[derive(Debug, Clone, Copy)]
pub struct PinchMeasurement {
    /// 像素空间的指尖间距
    pub distance: f64,
    /// 测量时刻
    pub at: Instant,
}

impl PinchMeasurement {
    pub fn new(distance: f64, at: Instant) -> Self {
        Self { distance, at }
    }
}
