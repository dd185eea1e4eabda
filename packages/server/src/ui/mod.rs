//! Axum server: WebSocket endpoint, HTTP endpoints and graceful shutdown.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::{Server, ServerError};
pub use state::AppState;
