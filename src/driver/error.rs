//! Driver error types.

use thiserror::Error;

use super::transport::CloseReason;
use crate::wire::WireError;

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Driver errors.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The transport closed while the request was queued or in flight.
    ///
    /// Delivered to every pending request when the connection goes away;
    /// carries the close reason reported by the transport.
    #[error("connection lost: {reason}")]
    ConnectionLost {
        /// Close reason reported by the transport.
        reason: CloseReason,
    },

    /// The client has already observed a terminal close and accepts no
    /// further traffic.
    #[error("client is closed")]
    ClientClosed,

    /// An outbound envelope failed to encode.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Transport-level failure surfaced by the adapter.
    #[error("transport error: {0}")]
    Transport(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DriverError {
    /// Connection-lost error for the given close reason.
    pub fn connection_lost(reason: CloseReason) -> Self {
        Self::ConnectionLost { reason }
    }

    /// Transport error from a message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Configuration error from a message.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Internal error from a message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error means the connection is gone.
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, Self::ConnectionLost { .. })
    }

    /// Close reason, for connection-lost errors.
    pub fn close_reason(&self) -> Option<&CloseReason> {
        match self {
            Self::ConnectionLost { reason } => Some(reason),
            _ => None,
        }
    }
}

impl From<WireError> for DriverError {
    fn from(err: WireError) -> Self {
        Self::Serialization(err.to_string())
    }
}
