//! WebSocket 服务端
//!
//! 每个连接在升级后被分配一个设备ID，注册出站通道，
//! 随后循环读取文本帧并交给事件处理器。

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use tokio::sync::mpsc;
use warp::ws::WebSocket;
use warp::Filter;

use crate::domain::device::DeviceId;
use crate::infrastructure::web::handlers::connection::ConnectionRegistry;
use crate::infrastructure::web::handlers::message_handler::MessageHandler;
use crate::message::{WelcomeMessage, WsMessage};

pub struct WebServer {
    addr: SocketAddr,
    registry: Arc<ConnectionRegistry>,
    handler: Arc<MessageHandler>,
}

impl WebServer {
    pub fn new(
        addr: SocketAddr,
        registry: Arc<ConnectionRegistry>,
        handler: Arc<MessageHandler>,
    ) -> Self {
        Self {
            addr,
            registry,
            handler,
        }
    }

    /// 启动服务，阻塞直到进程退出
    pub async fn run(&self) {
        let registry = self.registry.clone();
        let handler = self.handler.clone();

        let ws_route = warp::path("ws")
            .and(warp::ws())
            .and(warp::any().map(move || registry.clone()))
            .and(warp::any().map(move || handler.clone()))
            .map(
                |ws: warp::ws::Ws,
                 registry: Arc<ConnectionRegistry>,
                 handler: Arc<MessageHandler>| {
                    ws.on_upgrade(move |socket| client_connected(socket, registry, handler))
                },
            );

        info!("WebSocket server listening on {}", self.addr);
        warp::serve(ws_route).run(self.addr).await;
    }
}

/// 处理一条已升级的连接，连接关闭时返回
async fn client_connected(
    ws: WebSocket,
    registry: Arc<ConnectionRegistry>,
    handler: Arc<MessageHandler>,
) {
    let device_id = DeviceId::generate();
    let (mut ws_tx, mut ws_rx) = ws.split();

    // 出站消息经由通道串行写入套接字
    let (tx, mut rx) = mpsc::unbounded_channel();
    let forward_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if ws_tx.send(message).await.is_err() {
                break;
            }
        }
    });

    registry.register(device_id.clone(), tx).await;
    info!("[+] Connected: {}", device_id);

    // 告知设备其被分配的ID
    let welcome = WsMessage::Welcome(WelcomeMessage {
        device_id: device_id.clone(),
    });
    if let Err(e) = registry.send_to(&device_id, &welcome).await {
        warn!("Failed to send welcome to {}: {}", device_id, e);
    }

    while let Some(result) = ws_rx.next().await {
        let message = match result {
            Ok(message) => message,
            Err(e) => {
                warn!("WebSocket error from {}: {}", device_id, e);
                break;
            }
        };

        if message.is_close() {
            break;
        }

        // ping/pong 由 warp 处理，其余只关心文本帧
        let Ok(text) = message.to_str() else {
            continue;
        };

        match WsMessage::from_json(text) {
            Ok(message) => handler.handle_message(&device_id, message).await,
            Err(e) => warn!("Malformed frame from {}: {}", device_id, e),
        }
    }

    // 断开只做注销与日志；来源设备在途的负载保留在槽位中
    registry.unregister(&device_id).await;
    forward_task.abort();
    info!("[-] Disconnected: {}", device_id);
}
