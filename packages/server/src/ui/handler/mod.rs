//! Request handlers.

mod http;
mod websocket;

pub use http::{api_health, get_room_detail, health};
pub use websocket::websocket_handler;
