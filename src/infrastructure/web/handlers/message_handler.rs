use std::sync::Arc;

use log::{debug, error, info};

use crate::domain::device::DeviceId;
use crate::infrastructure::clipboard::ClipboardStore;
use crate::infrastructure::web::handlers::connection::ConnectionRegistry;
use crate::message::{
    GrabDataMessage, TransferCompletedMessage, WsMessage,
};

/// 传输事件处理器
///
/// 在已连接设备与剪贴板槽位之间路由事件
pub struct MessageHandler {
    store: Arc<ClipboardStore>,
    registry: Arc<ConnectionRegistry>,
}

impl MessageHandler {
    pub fn new(store: Arc<ClipboardStore>, registry: Arc<ConnectionRegistry>) -> Self {
        Self { store, registry }
    }

    /// 分发一条入站事件
    pub async fn handle_message(&self, sender: &DeviceId, message: WsMessage) {
        match message {
            WsMessage::GrabData(data) => self.handle_grab_data(sender, data).await,
            WsMessage::RequestDrop => self.handle_request_drop(sender).await,
            other => {
                debug!("Ignoring unexpected event from {}: {:?}", sender, other);
            }
        }
    }

    /// 处理抓取事件
    ///
    /// 写入剪贴板槽位并向发送者回执；不通知其他设备
    pub async fn handle_grab_data(&self, sender: &DeviceId, data: GrabDataMessage) {
        info!("[GRAB] Data stored from {}", sender);

        let payload = data.into_payload(sender.clone());
        self.store.set(payload).await;

        if let Err(e) = self
            .registry
            .send_to(sender, &WsMessage::server_response("Copied! Ready to Drop."))
            .await
        {
            error!("Failed to ack grab to {}: {}", sender, e);
        }
    }

    /// 处理取件请求
    ///
    /// 原子地取走槽位内容：有负载时投递给请求者并通知来源设备，
    /// 槽位为空时回执一条普通的空提示
    pub async fn handle_request_drop(&self, requester: &DeviceId) {
        info!("[DROP] Request from {}", requester);

        match self.store.take_and_clear().await {
            Some(payload) => {
                info!(
                    "Transferring payload {} from {} to {}",
                    payload.key(),
                    payload.origin,
                    requester
                );

                if let Err(e) = self
                    .registry
                    .send_to(requester, &WsMessage::ReceiveDrop((&payload).into()))
                    .await
                {
                    error!("Failed to deliver payload to {}: {}", requester, e);
                }

                // 通知来源设备交接完成；来源已断开时静默丢弃
                let completed = WsMessage::TransferCompleted(TransferCompletedMessage {
                    to_device: requester.clone(),
                });
                if let Err(e) = self.registry.send_to(&payload.origin, &completed).await {
                    debug!(
                        "Origin {} unreachable, dropping completion notice: {}",
                        payload.origin, e
                    );
                }
            }
            None => {
                if let Err(e) = self
                    .registry
                    .send_to(requester, &WsMessage::server_response("Clipboard is empty!"))
                    .await
                {
                    error!("Failed to reply empty notice to {}: {}", requester, e);
                }
            }
        }
    }
}
