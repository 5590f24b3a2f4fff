use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::utils::helpers::generate_device_id;

/// 设备标识
///
/// 由服务端在连接建立时分配的不透明令牌，
/// 协议层不复用底层传输的会话标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn generate() -> Self {
        Self(generate_device_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
