//! Error types for the book client

use thiserror::Error;

/// Book client errors
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Socket I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes at the head of the buffer can never become valid JSON.
    #[error("Malformed JSON stream at byte {offset}: {reason}")]
    MalformedStream { offset: usize, reason: String },

    #[error("Stream buffer exceeded {limit} bytes without a complete value")]
    BufferOverflow { limit: usize },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
