//! 传输客户端
//!
//! 把关键点流驱动的手势评估和服务端通知汇聚到同一个任务上，
//! `transfer_completed` 的状态复位不会与阈值评估竞争。

use std::time::Instant;

use anyhow::Result;
use log::{debug, error, info, warn};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;

use crate::application::gesture::{GestureEvent, GestureStateMachine};
use crate::domain::device::DeviceId;
use crate::domain::gesture::{GestureState, PinchMeasurement};
use crate::domain::landmark::{pinch_distance, HandFrame};
use crate::infrastructure::capture::CaptureSource;
use crate::infrastructure::network::WebSocketClient;
use crate::message::{GrabDataMessage, WsMessage};

pub struct TransferClient {
    machine: GestureStateMachine,
    ws: WebSocketClient,
    capture: Box<dyn CaptureSource>,
    device_id: Option<DeviceId>,
}

impl TransferClient {
    pub fn new(
        machine: GestureStateMachine,
        ws: WebSocketClient,
        capture: Box<dyn CaptureSource>,
    ) -> Self {
        Self {
            machine,
            ws,
            capture,
            device_id: None,
        }
    }

    pub fn state(&self) -> GestureState {
        self.machine.state()
    }

    /// 主循环，关键点流结束时返回
    pub async fn run(mut self, mut frames: mpsc::Receiver<HandFrame>) -> Result<()> {
        let mut server_rx = self.ws.subscribe();
        let mut server_open = true;

        loop {
            tokio::select! {
                frame = frames.recv() => {
                    match frame {
                        Some(frame) => self.handle_frame(frame),
                        None => {
                            info!("Landmark stream ended, shutting down");
                            break;
                        }
                    }
                }
                message = server_rx.recv(), if server_open => {
                    match message {
                        Ok(message) => self.handle_server_message(message),
                        Err(RecvError::Lagged(n)) => warn!("Dropped {} server messages", n),
                        Err(RecvError::Closed) => server_open = false,
                    }
                }
            }
        }

        Ok(())
    }

    /// 用一帧检测结果驱动状态机
    ///
    /// 没有检测到手或关键点不全的帧不产生测量值，状态原样保持
    fn handle_frame(&mut self, frame: HandFrame) {
        let Some(hand) = frame.first_hand() else {
            return;
        };
        let Some((thumb, index)) = hand.pinch_points() else {
            return;
        };

        let distance = pinch_distance(thumb, index, frame.width);
        let measurement = PinchMeasurement::new(distance, Instant::now());

        match self.machine.evaluate(measurement) {
            Some(GestureEvent::Grab) => {
                info!("[ACTION] GRAB! Capturing screen...");
                self.publish_grab();
            }
            Some(GestureEvent::Release) => {
                info!("[ACTION] RELEASED");
            }
            None => {}
        }
    }

    /// 抓取后发布负载
    ///
    /// 进入 Holding 不依赖服务端确认；未连接时发布被跳过并在本地提示
    fn publish_grab(&mut self) {
        if !self.ws.is_connected() {
            warn!("Server not connected, skipping publication");
            return;
        }

        match self.capture.capture() {
            Ok(capture) => {
                let message = WsMessage::GrabData(GrabDataMessage {
                    image_data: capture.bytes,
                    content_type: capture.content_type,
                });
                if let Err(e) = self.ws.send(&message) {
                    error!("Failed to publish grab: {}", e);
                }
            }
            Err(e) => error!("Screen capture failed: {}", e),
        }
    }

    fn handle_server_message(&mut self, message: WsMessage) {
        match message {
            WsMessage::Welcome(welcome) => {
                info!("[Connected] Linked to server as device {}", welcome.device_id);
                self.device_id = Some(welcome.device_id);
            }
            WsMessage::ServerResponse(response) => {
                // 仅展示，不影响状态
                info!("[Server] {}", response.message);
            }
            WsMessage::TransferCompleted(completed) => {
                info!("[SUCCESS] File transferred to {}!", completed.to_device);
                if self.machine.complete_transfer() {
                    info!("[RESET] Resetting state to IDLE");
                }
            }
            other => {
                debug!("Ignoring server event: {:?}", other);
            }
        }
    }
}
