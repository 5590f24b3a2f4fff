use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::http::Uri;
use tokio_tungstenite::tungstenite::Message as TungsteniteMessage;

use crate::message::WsMessage;

/// WebSocket 客户端
///
/// 连接后拆分读写两个任务：入站帧解析后广播给订阅者，
/// 出站消息经由通道串行写入。未连接时发送返回错误，由调用方在本地消化。
pub struct WebSocketClient {
    uri: Uri,
    writer_tx: Option<mpsc::UnboundedSender<TungsteniteMessage>>,
    message_tx: broadcast::Sender<WsMessage>,
    connected: Arc<AtomicBool>,
    read_task: Option<JoinHandle<()>>,
    write_task: Option<JoinHandle<()>>,
}

impl WebSocketClient {
    pub fn new(uri: Uri) -> Self {
        let (message_tx, _) = broadcast::channel(20);
        Self {
            uri,
            writer_tx: None,
            message_tx,
            connected: Arc::new(AtomicBool::new(false)),
            read_task: None,
            write_task: None,
        }
    }

    /// 建立连接并启动读写任务
    pub async fn connect(&mut self) -> Result<()> {
        let (ws_stream, _) = connect_async(self.uri.clone()).await?;
        let (mut sink, mut stream) = ws_stream.split();

        self.connected.store(true, Ordering::Relaxed);

        // 写任务
        let (writer_tx, mut writer_rx) = mpsc::unbounded_channel::<TungsteniteMessage>();
        let connected = self.connected.clone();
        self.write_task = Some(tokio::spawn(async move {
            while let Some(message) = writer_rx.recv().await {
                if sink.send(message).await.is_err() {
                    connected.store(false, Ordering::Relaxed);
                    break;
                }
            }
        }));

        // 读任务
        let message_tx = self.message_tx.clone();
        let connected = self.connected.clone();
        self.read_task = Some(tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(TungsteniteMessage::Text(text)) => match WsMessage::from_json(&text) {
                        Ok(message) => {
                            // 没有订阅者时发送失败是正常情况
                            let _ = message_tx.send(message);
                        }
                        Err(e) => warn!("Malformed frame from server: {}", e),
                    },
                    Ok(TungsteniteMessage::Close(_)) => {
                        info!("Server closed the connection");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("WebSocket read error: {}", e);
                        break;
                    }
                }
            }
            connected.store(false, Ordering::Relaxed);
        }));

        self.writer_tx = Some(writer_tx);
        Ok(())
    }

    /// 订阅服务端推送的事件
    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.message_tx.subscribe()
    }

    /// 发送一条事件
    pub fn send(&self, message: &WsMessage) -> Result<()> {
        if !self.is_connected() {
            anyhow::bail!("Not connected to server");
        }
        let writer_tx = self
            .writer_tx
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Not connected to server"))?;
        writer_tx
            .send(message.to_tungstenite_message())
            .map_err(|_| anyhow::anyhow!("Connection write channel closed"))?;
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// 断开连接
    pub async fn disconnect(&mut self) {
        if let Some(writer_tx) = self.writer_tx.take() {
            let _ = writer_tx.send(TungsteniteMessage::Close(None));
        }
        if let Some(task) = self.write_task.take() {
            task.abort();
        }
        if let Some(task) = self.read_task.take() {
            task.abort();
        }
        self.connected.store(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_without_connection_is_an_error() {
        let client = WebSocketClient::new("ws://localhost:9".parse::<Uri>().unwrap());
        assert!(!client.is_connected());
        assert!(client.send(&WsMessage::RequestDrop).is_err());
    }

    #[tokio::test]
    async fn test_connect_to_unreachable_server_fails() {
        // 端口 9 (discard) 上没有 WebSocket 服务
        let mut client = WebSocketClient::new("ws://127.0.0.1:9".parse::<Uri>().unwrap());
        assert!(client.connect().await.is_err());
        assert!(!client.is_connected());
    }
}
