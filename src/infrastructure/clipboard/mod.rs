//! 云剪贴板
//!
//! 服务端唯一的共享可变资源：最多持有一份待交接的负载。
//! 所有读写都经由这里的两个操作，取走与清空必须是同一个不可分步骤。

use log::{info, warn};
use tokio::sync::Mutex;

use crate::domain::payload::TransferPayload;

/// 单槽剪贴板存储
///
/// 槽位由互斥锁保护；`take_and_clear` 在一次加锁内完成检查与清空，
/// 两个并发的取件请求不可能同时拿到同一份负载。
pub struct ClipboardStore {
    slot: Mutex<Option<TransferPayload>>,
}

impl ClipboardStore {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// 写入负载，无条件覆盖
    ///
    /// 覆盖策略为后抓取者胜：前一份未被取走的负载被静默替换
    pub async fn set(&self, payload: TransferPayload) {
        let mut slot = self.slot.lock().await;
        if let Some(old) = slot.as_ref() {
            warn!(
                "Overwriting unclaimed payload {} from device {}",
                old.key(),
                old.origin
            );
        }
        info!("Clipboard slot updated: {}", payload);
        *slot = Some(payload);
    }

    /// 取走并清空
    ///
    /// 槽位为空时返回 None
    pub async fn take_and_clear(&self) -> Option<TransferPayload> {
        self.slot.lock().await.take()
    }

    pub async fn is_empty(&self) -> bool {
        self.slot.lock().await.is_none()
    }
}

impl Default for ClipboardStore {
    fn default() -> Self {
        Self::new()
    }
}
