use anyhow::Result;
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio_tungstenite::tungstenite::Message as TungsteniteMessage;
use warp::ws::Message as WarpMessage;

use crate::domain::device::DeviceId;
use crate::domain::payload::TransferPayload;

/// 设备与服务端之间的事件协议
///
/// JSON 文本帧，`type` 为事件名，`data` 为事件负载
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum WsMessage {
    /// 服务端 → 设备：连接建立后分配设备ID
    Welcome(WelcomeMessage),
    /// 设备 → 服务端：发布一份抓取到的负载
    GrabData(GrabDataMessage),
    /// 服务端 → 设备：通用确认/错误文本
    ServerResponse(ServerResponseMessage),
    /// 设备 → 服务端：请求取走待交接的负载
    RequestDrop,
    /// 服务端 → 设备：投递负载
    ReceiveDrop(ReceiveDropMessage),
    /// 服务端 → 来源设备：确认负载已被取走
    TransferCompleted(TransferCompletedMessage),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WelcomeMessage {
    pub device_id: DeviceId,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GrabDataMessage {
    #[serde(
        serialize_with = "serialize_bytes",
        deserialize_with = "deserialize_bytes"
    )]
    pub image_data: Bytes,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerResponseMessage {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReceiveDropMessage {
    #[serde(
        serialize_with = "serialize_bytes",
        deserialize_with = "deserialize_bytes"
    )]
    pub image_data: Bytes,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TransferCompletedMessage {
    pub to_device: DeviceId,
}

fn default_content_type() -> String {
    "image".to_string()
}

fn serialize_bytes<S>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let base64_string = base64::engine::general_purpose::STANDARD.encode(bytes);
    serializer.serialize_str(&base64_string)
}

fn deserialize_bytes<'de, D>(deserializer: D) -> Result<Bytes, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let base64_string = String::deserialize(deserializer)?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&base64_string)
        .map_err(|e| serde::de::Error::custom(e.to_string()))?;
    Ok(Bytes::from(bytes))
}

impl GrabDataMessage {
    /// 转换为服务端持有的传输负载
    pub fn into_payload(self, origin: DeviceId) -> TransferPayload {
        TransferPayload::new(self.image_data, self.content_type, origin)
    }
}

impl From<&TransferPayload> for ReceiveDropMessage {
    fn from(payload: &TransferPayload) -> Self {
        Self {
            image_data: payload.content(),
            content_type: payload.content_type.clone(),
        }
    }
}

impl WsMessage {
    pub fn server_response(message: impl Into<String>) -> Self {
        WsMessage::ServerResponse(ServerResponseMessage {
            message: message.into(),
        })
    }

    pub fn to_tungstenite_message(&self) -> TungsteniteMessage {
        TungsteniteMessage::text(serde_json::to_string(self).unwrap())
    }

    pub fn to_warp_message(&self) -> WarpMessage {
        WarpMessage::text(serde_json::to_string(self).unwrap())
    }

    pub fn to_json(&self) -> Result<String> {
        match serde_json::to_string(self) {
            Ok(json) => Ok(json),
            Err(e) => {
                anyhow::bail!("Failed to serialize WsMessage: {}", e)
            }
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| anyhow::anyhow!("Failed to parse WsMessage: {}", e))
    }
}
