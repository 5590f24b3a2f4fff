use std::collections::HashMap;

use anyhow::Result;
use tokio::sync::{mpsc, RwLock};
use warp::ws::Message as WarpMessage;

use crate::domain::device::DeviceId;
use crate::message::WsMessage;

/// 连接注册表
///
/// 维护设备ID到该连接出站通道的映射。
/// 事件的投递以设备ID寻址，协议层不接触底层套接字。
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<DeviceId, mpsc::UnboundedSender<WarpMessage>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// 注册一个连接
    pub async fn register(&self, device_id: DeviceId, tx: mpsc::UnboundedSender<WarpMessage>) {
        self.connections.write().await.insert(device_id, tx);
    }

    /// 移除一个连接
    pub async fn unregister(&self, device_id: &DeviceId) {
        self.connections.write().await.remove(device_id);
    }

    /// 向指定设备发送事件
    ///
    /// 设备不在线或其连接已关闭时返回错误，由调用方决定是否忽略
    pub async fn send_to(&self, device_id: &DeviceId, message: &WsMessage) -> Result<()> {
        let connections = self.connections.read().await;
        let tx = connections
            .get(device_id)
            .ok_or_else(|| anyhow::anyhow!("Device {} is not connected", device_id))?;
        tx.send(message.to_warp_message())
            .map_err(|_| anyhow::anyhow!("Connection to device {} is closed", device_id))?;
        Ok(())
    }

    pub async fn is_connected(&self, device_id: &DeviceId) -> bool {
        self.connections.read().await.contains_key(device_id)
    }

    pub async fn count(&self) -> usize {
        self.connections.read().await.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_send_unregister() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = DeviceId::from("000001");

        registry.register(id.clone(), tx).await;
        assert!(registry.is_connected(&id).await);
        assert_eq!(registry.count().await, 1);

        registry
            .send_to(&id, &WsMessage::server_response("hello"))
            .await
            .unwrap();
        let received = rx.recv().await.unwrap();
        let parsed = WsMessage::from_json(received.to_str().unwrap()).unwrap();
        assert!(matches!(parsed, WsMessage::ServerResponse(r) if r.message == "hello"));

        registry.unregister(&id).await;
        assert!(!registry.is_connected(&id).await);
        assert!(registry
            .send_to(&id, &WsMessage::server_response("gone"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_send_to_closed_connection_is_an_error() {
        let registry = ConnectionRegistry::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let id = DeviceId::from("000002");

        registry.register(id.clone(), tx).await;
        drop(rx);

        assert!(registry
            .send_to(&id, &WsMessage::server_response("hello"))
            .await
            .is_err());
    }
}
