//! Wire protocol error types.

use thiserror::Error;

/// Result type for wire operations.
pub type WireResult<T> = Result<T, WireError>;

/// Wire protocol errors.
///
/// On the inbound path these are discard conditions, not failures: a payload
/// that cannot be decoded carries no correlation id, so there is no pending
/// request to deliver it to.
#[derive(Error, Debug)]
pub enum WireError {
    /// Payload is not a valid message envelope.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Envelope parsed but carries no usable correlation id.
    #[error("message has no correlation id")]
    MissingRequestId,
}
