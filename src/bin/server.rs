use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use log::{error, info};

use pinchdrop::config::Setting;
use pinchdrop::infrastructure::clipboard::ClipboardStore;
use pinchdrop::infrastructure::web::{ConnectionRegistry, MessageHandler, WebServer};
use pinchdrop::utils::helpers::get_local_ip;
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

    let port = setting.network.webserver_port;
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    let store = Arc::new(ClipboardStore::new());
    let registry = Arc::new(ConnectionRegistry::new());
    let handler = Arc::new(MessageHandler::new(store, registry.clone()));

    let ip = get_local_ip();
    info!("=======================================");
    info!("   DEVICE URL: ws://{}:{}/ws", ip, port);
    info!("=======================================");

    WebServer::new(addr, registry, handler).run().await;

    Ok(())
}
