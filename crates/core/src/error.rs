use crate::config::ConfigError;
use crate::message::MessageError;

use thiserror::Error;

/// Result type alias for mathcast-core
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for mathcast
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error for file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Provider errors (request building, transport setup)
    #[error("provider error: {0}")]
    Provider(String),

    /// A message that failed validation at the transport boundary
    #[error("message error: {0}")]
    Message(#[from] MessageError),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a provider error from anything displayable
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }
}
