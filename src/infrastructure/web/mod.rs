pub mod handlers;
pub mod webserver;

pub use handlers::connection::ConnectionRegistry;
pub use handlers::message_handler::MessageHandler;
pub use webserver::WebServer;
