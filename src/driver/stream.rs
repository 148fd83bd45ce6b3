//! Streaming result consumption.
//!
//! A [`ResultStream`] is the caller-facing side of a request submitted in
//! streaming mode: one [`ResultPage`] per partial envelope, in arrival
//! order, fed by the dispatcher through an unbounded channel.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use serde_json::Value;
use tokio::sync::mpsc;

use super::error::{DriverError, DriverResult};
use crate::wire::ResponseMessage;

/// Items carried by one partial response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    items: Vec<Value>,
}

impl ResultPage {
    /// New page from flattened fragment items.
    pub fn new(items: Vec<Value>) -> Self {
        Self { items }
    }

    /// Items in this page.
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Consume the page into its items.
    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the page carries no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for ResultPage {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Dispatcher-to-stream hand-off.
#[derive(Debug)]
pub(crate) enum StreamSignal {
    /// One partial fragment.
    Page(ResultPage),
    /// Terminal envelope; the stream ends after this.
    End(ResponseMessage),
    /// The request was failed; the stream yields the error and ends.
    Terminated(DriverError),
}

/// Asynchronous stream of result pages for one request.
///
/// Yields `Ok(page)` per partial envelope and ends when the final envelope
/// arrives; the final envelope itself is retained as [`summary`]. If the
/// connection is lost first, the stream yields a single `Err` and ends.
///
/// [`summary`]: ResultStream::summary
#[derive(Debug)]
pub struct ResultStream {
    rx: mpsc::UnboundedReceiver<StreamSignal>,
    summary: Option<ResponseMessage>,
    finished: bool,
}

impl ResultStream {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<StreamSignal>) -> Self {
        Self {
            rx,
            summary: None,
            finished: false,
        }
    }

    /// The final envelope, available once the stream has ended normally.
    pub fn summary(&self) -> Option<&ResponseMessage> {
        self.summary.as_ref()
    }

    /// Drain the stream, flattening every page into one item vector.
    ///
    /// Equivalent to consuming the request in collecting mode, minus the
    /// final envelope's own fragment.
    pub async fn try_collect(mut self) -> DriverResult<Vec<Value>> {
        use tokio_stream::StreamExt;

        let mut items = Vec::new();
        while let Some(page) = self.next().await {
            items.extend(page?.into_items());
        }
        Ok(items)
    }
}

impl Stream for ResultStream {
    type Item = DriverResult<ResultPage>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(StreamSignal::Page(page))) => Poll::Ready(Some(Ok(page))),
            Poll::Ready(Some(StreamSignal::End(message))) => {
                self.finished = true;
                self.summary = Some(message);
                Poll::Ready(None)
            }
            Poll::Ready(Some(StreamSignal::Terminated(error))) => {
                self.finished = true;
                Poll::Ready(Some(Err(error)))
            }
            // Producer dropped without a terminal signal; nothing more can
            // arrive.
            Poll::Ready(None) => {
                self.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::ResponseKind;
    use serde_json::json;
    use tokio_stream::StreamExt;

    fn channel_stream() -> (mpsc::UnboundedSender<StreamSignal>, ResultStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, ResultStream::new(rx))
    }

    fn end_message() -> ResponseMessage {
        ResponseMessage {
            request_id: "req-1".into(),
            kind: ResponseKind::Final,
            result: Value::Null,
        }
    }

    #[test]
    fn test_result_page() {
        let page = ResultPage::new(vec![json!(1), json!(2)]);
        assert_eq!(page.len(), 2);
        assert!(!page.is_empty());
        assert_eq!(page.items(), &[json!(1), json!(2)]);
        assert_eq!(page.clone().into_items(), vec![json!(1), json!(2)]);

        let collected: Vec<Value> = page.into_iter().collect();
        assert_eq!(collected, vec![json!(1), json!(2)]);
    }

    #[tokio::test]
    async fn test_pages_then_end() {
        let (tx, mut stream) = channel_stream();
        tx.send(StreamSignal::Page(ResultPage::new(vec![json!("a")])))
            .unwrap();
        tx.send(StreamSignal::Page(ResultPage::new(vec![json!("b")])))
            .unwrap();
        tx.send(StreamSignal::End(end_message())).unwrap();

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.items(), &[json!("a")]);
        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second.items(), &[json!("b")]);

        assert!(stream.next().await.is_none());
        assert!(stream.summary().unwrap().is_final());

        // The stream stays finished.
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_termination_yields_error_then_ends() {
        let (tx, mut stream) = channel_stream();
        tx.send(StreamSignal::Terminated(DriverError::ClientClosed))
            .unwrap();

        let err = stream.next().await.unwrap().unwrap_err();
        assert!(matches!(err, DriverError::ClientClosed));
        assert!(stream.next().await.is_none());
        assert!(stream.summary().is_none());
    }

    #[tokio::test]
    async fn test_dropped_producer_ends_stream() {
        let (tx, mut stream) = channel_stream();
        drop(tx);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_try_collect_flattens_pages() {
        let (tx, stream) = channel_stream();
        tx.send(StreamSignal::Page(ResultPage::new(vec![json!(1), json!(2)])))
            .unwrap();
        tx.send(StreamSignal::Page(ResultPage::new(vec![json!(3)])))
            .unwrap();
        tx.send(StreamSignal::End(end_message())).unwrap();

        let items = stream.try_collect().await.unwrap();
        assert_eq!(items, vec![json!(1), json!(2), json!(3)]);
    }

    #[tokio::test]
    async fn test_try_collect_surfaces_termination() {
        let (tx, stream) = channel_stream();
        tx.send(StreamSignal::Page(ResultPage::new(vec![json!(1)])))
            .unwrap();
        tx.send(StreamSignal::Terminated(DriverError::ClientClosed))
            .unwrap();

        assert!(stream.try_collect().await.is_err());
    }
}
