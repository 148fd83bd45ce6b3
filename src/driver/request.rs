//! Pending request state and result delivery.

use bytes::Bytes;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use super::error::{DriverError, DriverResult};
use super::stream::{ResultPage, StreamSignal};
use crate::wire::ResponseMessage;

/// How results for a request are handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsumptionMode {
    /// Buffer every partial fragment and deliver one aggregate on
    /// completion. Suited to small, bounded results.
    #[default]
    Collecting,
    /// Deliver each partial fragment as it arrives plus a completion
    /// signal. Suited to large or open-ended result sets.
    Streaming,
}

/// Where a request's results go.
///
/// Exactly one terminal delivery happens per request: both
/// [`PendingRequest::complete`] and [`PendingRequest::terminate`] consume
/// the request, so a second terminal outcome is unrepresentable.
pub(crate) enum ResponseSink {
    /// Buffer fragments, resolve the caller once with the aggregate.
    Collect {
        accumulated: Vec<Value>,
        done: oneshot::Sender<DriverResult<Vec<Value>>>,
    },
    /// Forward each fragment to a stream as it arrives.
    Stream {
        tx: mpsc::UnboundedSender<StreamSignal>,
    },
}

impl ResponseSink {
    /// Sink that accumulates into a single completion.
    pub(crate) fn collect(done: oneshot::Sender<DriverResult<Vec<Value>>>) -> Self {
        Self::Collect {
            accumulated: Vec::new(),
            done,
        }
    }

    /// Sink that forwards fragments to a stream channel.
    pub(crate) fn stream(tx: mpsc::UnboundedSender<StreamSignal>) -> Self {
        Self::Stream { tx }
    }

    /// Consumption mode this sink implements.
    pub(crate) fn mode(&self) -> ConsumptionMode {
        match self {
            Self::Collect { .. } => ConsumptionMode::Collecting,
            Self::Stream { .. } => ConsumptionMode::Streaming,
        }
    }
}

/// One in-flight script execution.
///
/// Holds the encoded envelope so a request queued before the connection is
/// established can be flushed later byte-identically.
pub(crate) struct PendingRequest {
    id: String,
    script: String,
    payload: Bytes,
    sink: ResponseSink,
}

impl PendingRequest {
    pub(crate) fn new(
        id: String,
        script: String,
        payload: Bytes,
        sink: ResponseSink,
    ) -> Self {
        Self {
            id,
            script,
            payload,
            sink,
        }
    }

    /// Correlation id.
    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    /// Script text, for diagnostics.
    pub(crate) fn script(&self) -> &str {
        &self.script
    }

    /// Encoded wire envelope. Cheap to clone.
    pub(crate) fn payload(&self) -> Bytes {
        self.payload.clone()
    }

    /// Consumption mode.
    pub(crate) fn mode(&self) -> ConsumptionMode {
        self.sink.mode()
    }

    /// Feed one partial envelope.
    ///
    /// Collecting: the fragment joins the accumulator, nothing reaches the
    /// caller yet. Streaming: the fragment is delivered immediately.
    pub(crate) fn accept_partial(&mut self, message: ResponseMessage) {
        match &mut self.sink {
            ResponseSink::Collect { accumulated, .. } => {
                accumulated.extend(message.into_fragment());
            }
            ResponseSink::Stream { tx } => {
                let _ = tx.send(StreamSignal::Page(ResultPage::new(message.into_fragment())));
            }
        }
    }

    /// Feed the final envelope, consuming the request.
    ///
    /// Collecting: the final fragment is merged and the aggregate resolves
    /// the caller. Streaming: the envelope rides the end-of-stream signal
    /// without merging.
    pub(crate) fn complete(self, message: ResponseMessage) {
        match self.sink {
            ResponseSink::Collect {
                mut accumulated,
                done,
            } => {
                accumulated.extend(message.into_fragment());
                let _ = done.send(Ok(accumulated));
            }
            ResponseSink::Stream { tx } => {
                let _ = tx.send(StreamSignal::End(message));
            }
        }
    }

    /// Fail the request, consuming it.
    pub(crate) fn terminate(self, error: DriverError) {
        match self.sink {
            ResponseSink::Collect { done, .. } => {
                let _ = done.send(Err(error));
            }
            ResponseSink::Stream { tx } => {
                let _ = tx.send(StreamSignal::Terminated(error));
            }
        }
    }
}

impl std::fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest")
            .field("id", &self.id)
            .field("script", &self.script)
            .field("mode", &self.mode())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{RequestMessage, ResponseKind};
    use serde_json::json;

    fn pending(sink: ResponseSink) -> PendingRequest {
        let payload = RequestMessage::eval("req-1", "g.V()").to_bytes().unwrap();
        PendingRequest::new("req-1".into(), "g.V()".into(), payload, sink)
    }

    fn partial(result: serde_json::Value) -> ResponseMessage {
        ResponseMessage {
            request_id: "req-1".into(),
            kind: ResponseKind::Partial,
            result,
        }
    }

    fn final_msg(result: serde_json::Value) -> ResponseMessage {
        ResponseMessage {
            request_id: "req-1".into(),
            kind: ResponseKind::Final,
            result,
        }
    }

    #[test]
    fn test_collect_accumulates_in_arrival_order() {
        let (done, mut rx) = oneshot::channel();
        let mut request = pending(ResponseSink::collect(done));
        assert_eq!(request.mode(), ConsumptionMode::Collecting);

        request.accept_partial(partial(json!([1, 2])));
        // No caller-visible delivery until the final envelope.
        assert!(rx.try_recv().is_err());

        request.accept_partial(partial(json!([3])));
        request.complete(final_msg(json!([4])));

        let items = rx.try_recv().unwrap().unwrap();
        assert_eq!(items, vec![json!(1), json!(2), json!(3), json!(4)]);
    }

    #[test]
    fn test_stream_delivers_each_fragment() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut request = pending(ResponseSink::stream(tx));
        assert_eq!(request.mode(), ConsumptionMode::Streaming);

        request.accept_partial(partial(json!(["a"])));
        request.accept_partial(partial(json!(["b"])));
        request.complete(final_msg(serde_json::Value::Null));

        match rx.try_recv().unwrap() {
            StreamSignal::Page(page) => assert_eq!(page.items(), &[json!("a")]),
            other => panic!("expected page, got {other:?}"),
        }
        match rx.try_recv().unwrap() {
            StreamSignal::Page(page) => assert_eq!(page.items(), &[json!("b")]),
            other => panic!("expected page, got {other:?}"),
        }
        assert!(matches!(rx.try_recv().unwrap(), StreamSignal::End(_)));
    }

    #[test]
    fn test_terminate_collect() {
        let (done, mut rx) = oneshot::channel();
        let request = pending(ResponseSink::collect(done));

        request.terminate(DriverError::ClientClosed);

        let err = rx.try_recv().unwrap().unwrap_err();
        assert!(matches!(err, DriverError::ClientClosed));
    }

    #[test]
    fn test_terminate_stream() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = pending(ResponseSink::stream(tx));

        request.terminate(DriverError::ClientClosed);

        assert!(matches!(
            rx.try_recv().unwrap(),
            StreamSignal::Terminated(DriverError::ClientClosed)
        ));
    }

    #[test]
    fn test_delivery_survives_dropped_caller() {
        let (done, rx) = oneshot::channel();
        let request = pending(ResponseSink::collect(done));
        drop(rx);
        // A caller that went away must not panic the dispatcher.
        request.complete(final_msg(json!([1])));
    }
}
