use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use twox_hash::xxh3::hash64;

use crate::domain::device::DeviceId;

/// 传输负载
///
/// 系统内唯一的交接单元：一份已编码的屏幕截图及其来源设备
#[derive(Debug, Clone)]
pub struct TransferPayload {
    content: Bytes,
    pub content_type: String,
    pub origin: DeviceId,
    pub timestamp: DateTime<Utc>,
}

impl TransferPayload {
    pub fn new(content: Bytes, content_type: String, origin: DeviceId) -> Self {
        Self {
            content,
            content_type,
            origin,
            timestamp: Utc::now(),
        }
    }

    pub fn content(&self) -> Bytes {
        self.content.clone()
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// 获取负载的唯一标识符，用于日志
    pub fn key(&self) -> String {
        format!("{:016x}", hash64(&self.content))
    }
}

// 友好的展示大小
fn friendly_size(size: usize) -> String {
    if size < 1024 {
        format!("{} B", size)
    } else if size < 1024 * 1024 {
        format!("{} KB", size / 1024)
    } else {
        format!("{} MB", size / 1024 / 1024)
    }
}

impl fmt::Display for TransferPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TransferPayload[{}] - 类型: {}, 来源: {}, 时间: {}, 大小: {}",
            self.key(),
            self.content_type,
            self.origin,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            friendly_size(self.size())
        )
    }
}

impl PartialEq for TransferPayload {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for TransferPayload {}
