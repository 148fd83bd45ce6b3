//! Outbound request envelopes.
//!
//! Request envelopes are sent from the client to the server.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::super::{ACCEPT_JSON, OP_EVAL, PROCESSOR_DEFAULT, PROCESSOR_SESSION};
use crate::wire::WireResult;

/// Arguments block of a request envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestArgs {
    /// Traversal script text to evaluate.
    pub gremlin: String,
    /// MIME type the caller accepts for results.
    pub accept: String,
    /// Session identifier, empty unless session mode is enabled.
    pub session: String,
}

/// One outbound request envelope.
///
/// The correlation id is echoed back on every response envelope the server
/// produces for this request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMessage {
    /// Correlation id, unique per request.
    pub request_id: String,
    /// Processor selector: empty for sessionless, `"session"` for
    /// session-scoped execution.
    pub processor: String,
    /// Operation name.
    pub op: String,
    /// Operation arguments.
    pub args: RequestArgs,
}

impl RequestMessage {
    /// Create a sessionless script evaluation envelope.
    pub fn eval(request_id: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            processor: PROCESSOR_DEFAULT.to_string(),
            op: OP_EVAL.to_string(),
            args: RequestArgs {
                gremlin: script.into(),
                accept: ACCEPT_JSON.to_string(),
                session: String::new(),
            },
        }
    }

    /// Tag this envelope with a session id, switching it to the server's
    /// session-scoped processor.
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.processor = PROCESSOR_SESSION.to_string();
        self.args.session = session.into();
        self
    }

    /// Whether this envelope targets the session-scoped processor.
    pub fn is_session_scoped(&self) -> bool {
        self.processor == PROCESSOR_SESSION
    }

    /// Encode the envelope for the transport.
    pub fn to_bytes(&self) -> WireResult<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }
}
