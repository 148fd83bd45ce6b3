//! Transport adapter seam.
//!
//! The driver does not own a socket. It consumes a [`Transport`]
//! implementation that knows how to establish the physical connection,
//! frame outbound payloads, and deliver inbound payloads and lifecycle
//! signals back as [`TransportEvent`]s on a notification channel.

use std::fmt;

use bytes::Bytes;
use thiserror::Error;
use tokio::sync::mpsc;

use super::error::DriverResult;

/// Reason reported by the transport when the connection goes away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseReason {
    /// Protocol-level close code, when the transport has one.
    pub code: Option<u16>,
    /// Human-readable detail.
    pub message: String,
}

impl CloseReason {
    /// New close reason with an optional close code.
    pub fn new(code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Close reason carrying only a detail message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Transport-level fault distinct from connection closure.
///
/// The dispatcher treats these as informational: they are logged, and
/// request termination is driven only by [`TransportEvent::Closed`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    /// Fault description.
    pub message: String,
}

impl TransportError {
    /// New transport error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Notifications a transport adapter delivers to the driver.
///
/// The set is fixed: after [`Closed`](TransportEvent::Closed) no further
/// events are expected for the connection.
#[derive(Debug)]
pub enum TransportEvent {
    /// The connection is established and ready to carry messages.
    Connected,
    /// One inbound message payload.
    Message(Bytes),
    /// The connection is gone.
    Closed(CloseReason),
    /// Out-of-band fault. Informational only; does not imply closure.
    Error(TransportError),
}

/// A bidirectional message transport.
///
/// Implementations own the physical connection (typically a WebSocket) and
/// its framing. Delivery of sent payloads is not acknowledged.
pub trait Transport: Send + Sync + 'static {
    /// Begin establishing the connection.
    ///
    /// Completion is signaled by [`TransportEvent::Connected`] on the
    /// returned notification channel; failure by
    /// [`TransportEvent::Closed`].
    fn connect(&self) -> DriverResult<mpsc::UnboundedReceiver<TransportEvent>>;

    /// Queue one outbound payload for delivery.
    fn send(&self, payload: Bytes) -> DriverResult<()>;
}
