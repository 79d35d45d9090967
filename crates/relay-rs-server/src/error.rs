//! Error types for the stdio server.

use thiserror::Error;

/// Errors that stop the server loop.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Reading input or writing output failed.
    #[error("stdio failure: {0}")]
    Io(#[from] std::io::Error),
    /// A response frame could not be encoded.
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
    /// The writer task ended abnormally.
    #[error("response writer stopped: {0}")]
    Writer(String),
    /// The call permit pool was closed.
    #[error("call permits closed: {0}")]
    PermitsClosed(#[from] tokio::sync::AcquireError),
    /// `max_in_flight` was zero.
    #[error("max_in_flight must be greater than zero")]
    NoCapacity,
}
