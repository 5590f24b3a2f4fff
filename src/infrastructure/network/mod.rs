pub mod websocket;

pub use websocket::WebSocketClient;
