//! Server configuration.
//!
//! Values come from command line flags or the environment (see the
//! `irori-server` binary); this module only holds the resolved settings.

use std::time::Duration;

/// Default TTL applied to a room when its last user leaves
pub const DEFAULT_ROOM_TTL_SECS: u64 = 3600;

/// Default origin allowed to open the WebSocket handshake
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:5173";

/// Default interval of the expired-key sweeper
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// TTL set on all room keys once the room becomes empty
    pub room_ttl: Duration,
    /// Origin allowed by CORS
    pub frontend_origin: String,
    pub sweep_interval: Duration,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            room_ttl: Duration::from_secs(DEFAULT_ROOM_TTL_SECS),
            frontend_origin: DEFAULT_FRONTEND_ORIGIN.to_string(),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}
