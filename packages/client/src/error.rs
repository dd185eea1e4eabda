//! Error types for the Irori client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server URL cannot be used at all
    #[error("Invalid server URL '{0}'")]
    InvalidUrl(String),

    /// The server did not announce the connection id
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}
