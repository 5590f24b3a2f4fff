use anyhow::{Context, Result};
use log::{error, info, warn};
use tokio::sync::mpsc;

use pinchdrop::application::{GestureStateMachine, GestureTuning, TransferClient};
use pinchdrop::config::Setting;
use pinchdrop::infrastructure::capture::CommandCapture;
use pinchdrop::infrastructure::network::WebSocketClient;
use pinchdrop::infrastructure::tracking::{spawn_frame_reader, DetectorProcess};
use pinchdrop::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    // 加载用户设置
    let setting = match Setting::load(None) {
        Ok(setting) => setting,
        Err(e) => {
            error!("Failed to load setting, falling back to defaults: {}", e);
            Setting::default()
        }
    };

    let tuning = GestureTuning::from_setting(&setting.gesture)?;
    let machine = GestureStateMachine::new(tuning);
    let capture = CommandCapture::from_setting(&setting.capture)?;

    // 关键点检测器在独立线程中读取，经通道送入评估循环
    let detector = DetectorProcess::new(&setting.tracking.command)?;
    let (frame_tx, frame_rx) = mpsc::channel(16);
    let _reader = spawn_frame_reader(detector, frame_tx);

    let uri = setting
        .network
        .server_url
        .parse()
        .with_context(|| format!("Invalid server URL: {}", setting.network.server_url))?;
    let mut ws = WebSocketClient::new(uri);

    // 连接失败不致命：抓取照常进行，只是发布被跳过
    match ws.connect().await {
        Ok(_) => info!("[Connected] Linked to server"),
        Err(e) => warn!(
            "Server not found, running locally (start pinchdrop-server first): {}",
            e
        ),
    }

    TransferClient::new(machine, ws, Box::new(capture))
        .run(frame_rx)
        .await
}
