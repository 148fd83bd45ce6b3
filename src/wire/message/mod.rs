//! Wire message envelopes.
//!
//! Request envelopes travel from the client to the server; response
//! envelopes travel back, tagged with the originating request's correlation
//! id and a numeric kind discriminator.

mod request;
mod response;

pub use request::{RequestArgs, RequestMessage};
pub use response::{ResponseKind, ResponseMessage};

/// Numeric kind discriminators carried by inbound envelopes.
pub mod kind {
    /// Terminal envelope: the response is complete.
    pub const FINAL: i64 = 0;
    /// Intermediate envelope: more data follows.
    pub const PARTIAL: i64 = 1;
}
