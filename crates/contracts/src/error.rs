//! Sink-level error definitions
//!
//! Errors surfaced by `PacketWriter` implementations. Stream-level errors
//! (bound violations, lifecycle violations) live in the stream crate.

use thiserror::Error;

/// Unified sink error type
#[derive(Debug, Error)]
pub enum SinkError {
    /// Packet write failed
    #[error("sink '{sink}' write error: {message}")]
    Write { sink: String, message: String },

    /// Connection establishment or transport failure
    #[error("sink '{sink}' connection error: {message}")]
    Connection { sink: String, message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl SinkError {
    /// Create a write error
    pub fn write(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Write {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            sink: sink.into(),
            message: message.into(),
        }
    }
}
