//! # Wire Protocol Layer
//!
//! Typed message envelopes for communication with Gremlin-compatible
//! graph servers.
//!
//! ## Overview
//!
//! The wire format is JSON. Every outbound envelope carries a correlation
//! identifier that the server echoes back on each response, which is how the
//! driver routes multi-part responses to the request that caused them:
//!
//! - **Request envelope** - correlation id, processor selector, operation
//!   name, and an arguments block with the script text
//! - **Response envelope** - correlation id, a numeric kind discriminator
//!   (final vs. partial), and an optional result fragment
//!
//! ## Submodules
//!
//! - [`message`] - request/response envelope types
//! - [`error`] - wire-level error types
//!
//! ## Note
//!
//! Most users should use the high-level [`crate::driver`] module instead of
//! building envelopes directly.

pub mod error;
pub mod message;

pub use error::{WireError, WireResult};
pub use message::{RequestArgs, RequestMessage, ResponseKind, ResponseMessage};

/// MIME type requested for serialized results.
pub const ACCEPT_JSON: &str = "application/json";

/// Operation name for script evaluation requests.
pub const OP_EVAL: &str = "eval";

/// Processor selector for the server's sessionless executor.
pub const PROCESSOR_DEFAULT: &str = "";

/// Processor selector for the server's session-scoped executor.
pub const PROCESSOR_SESSION: &str = "session";
