//! Inbound response envelopes.
//!
//! Response envelopes are sent from the server to the client. A request
//! produces zero or more partial envelopes followed by exactly one final
//! envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::kind;
use crate::wire::{WireError, WireResult};

/// Kind discriminator of a response envelope.
///
/// Kinds other than [`Final`](ResponseKind::Final) and
/// [`Partial`](ResponseKind::Partial) are preserved but ignored by the
/// dispatcher, so unknown codes from newer servers are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ResponseKind {
    /// End of response: the request is complete.
    Final,
    /// Intermediate data: more envelopes follow.
    Partial,
    /// Unrecognized kind code.
    Other(i64),
}

impl ResponseKind {
    /// Numeric code carried on the wire.
    pub fn code(&self) -> i64 {
        match self {
            ResponseKind::Final => kind::FINAL,
            ResponseKind::Partial => kind::PARTIAL,
            ResponseKind::Other(code) => *code,
        }
    }
}

impl From<i64> for ResponseKind {
    fn from(code: i64) -> Self {
        match code {
            kind::FINAL => ResponseKind::Final,
            kind::PARTIAL => ResponseKind::Partial,
            other => ResponseKind::Other(other),
        }
    }
}

impl From<ResponseKind> for i64 {
    fn from(kind: ResponseKind) -> Self {
        kind.code()
    }
}

/// One inbound response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMessage {
    /// Correlation id of the request this envelope answers.
    pub request_id: String,
    /// Kind discriminator.
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    /// Result fragment, absent on envelopes that carry no data.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub result: Value,
}

impl ResponseMessage {
    /// Decode an envelope from a raw transport payload.
    ///
    /// Fails on invalid JSON and on envelopes with an empty correlation id;
    /// both are discard conditions for the dispatcher.
    pub fn from_slice(payload: &[u8]) -> WireResult<Self> {
        let message: Self = serde_json::from_slice(payload)?;
        if message.request_id.is_empty() {
            return Err(WireError::MissingRequestId);
        }
        Ok(message)
    }

    /// Whether this is the terminal envelope for its request.
    pub fn is_final(&self) -> bool {
        self.kind == ResponseKind::Final
    }

    /// Whether this envelope carries intermediate data.
    pub fn is_partial(&self) -> bool {
        self.kind == ResponseKind::Partial
    }

    /// Flatten the result fragment into its items.
    ///
    /// Array fragments contribute their elements, scalar fragments
    /// contribute themselves, and an absent fragment contributes nothing,
    /// so accumulating across envelopes behaves like concatenation in
    /// arrival order.
    pub fn into_fragment(self) -> Vec<Value> {
        match self.result {
            Value::Null => Vec::new(),
            Value::Array(items) => items,
            other => vec![other],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(kind_code: i64, result: Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "requestId": "req-1",
            "type": kind_code,
            "result": result,
        }))
        .unwrap()
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(ResponseKind::from(0), ResponseKind::Final);
        assert_eq!(ResponseKind::from(1), ResponseKind::Partial);
        assert_eq!(ResponseKind::from(7), ResponseKind::Other(7));

        assert_eq!(ResponseKind::Final.code(), 0);
        assert_eq!(ResponseKind::Partial.code(), 1);
        assert_eq!(ResponseKind::Other(7).code(), 7);
    }

    #[test]
    fn test_decode_final() {
        let msg = ResponseMessage::from_slice(&envelope(0, json!([1, 2]))).unwrap();
        assert_eq!(msg.request_id, "req-1");
        assert!(msg.is_final());
        assert!(!msg.is_partial());
        assert_eq!(msg.into_fragment(), vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_decode_partial() {
        let msg = ResponseMessage::from_slice(&envelope(1, json!(["a"]))).unwrap();
        assert!(msg.is_partial());
    }

    #[test]
    fn test_decode_unknown_kind() {
        let msg = ResponseMessage::from_slice(&envelope(42, Value::Null)).unwrap();
        assert_eq!(msg.kind, ResponseKind::Other(42));
        assert!(!msg.is_final());
        assert!(!msg.is_partial());
    }

    #[test]
    fn test_decode_missing_result() {
        let payload = serde_json::to_vec(&json!({
            "requestId": "req-1",
            "type": 0,
        }))
        .unwrap();
        let msg = ResponseMessage::from_slice(&payload).unwrap();
        assert_eq!(msg.result, Value::Null);
        assert!(msg.into_fragment().is_empty());
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        let err = ResponseMessage::from_slice(b"{not json").unwrap_err();
        assert!(matches!(err, WireError::Malformed(_)));
    }

    #[test]
    fn test_decode_rejects_missing_request_id() {
        let payload = serde_json::to_vec(&json!({ "type": 0 })).unwrap();
        let err = ResponseMessage::from_slice(&payload).unwrap_err();
        assert!(matches!(err, WireError::Malformed(_)));

        let payload = serde_json::to_vec(&json!({ "requestId": "", "type": 0 })).unwrap();
        let err = ResponseMessage::from_slice(&payload).unwrap_err();
        assert!(matches!(err, WireError::MissingRequestId));
    }

    #[test]
    fn test_scalar_fragment_contributes_itself() {
        let msg = ResponseMessage::from_slice(&envelope(1, json!({"id": 3}))).unwrap();
        assert_eq!(msg.into_fragment(), vec![json!({"id": 3})]);
    }
}
