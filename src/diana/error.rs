//! Client error types.

use std::time::Duration;

use thiserror::Error;

/// DianaDB client errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection could not be established.
    #[error("connection error: {0}")]
    Connection(String),

    /// Connecting took longer than the configured timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The client has no open connections.
    #[error("client is not connected")]
    NotConnected,

    /// Malformed or oversized frame.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The server answered with `ok: false`.
    #[error("server error: {0}")]
    Server(String),

    /// A document does not match its model's schema.
    #[error("document rejected by model {model}: {message}")]
    Schema {
        model: &'static str,
        message: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
