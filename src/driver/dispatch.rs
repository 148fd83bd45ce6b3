//! Request registry and dispatcher.
//!
//! The core of the driver: owns the mapping from correlation id to pending
//! request, the pre-connection FIFO queue, and the demultiplexing of inbound
//! envelopes back to the request that caused them. All registry mutation
//! happens under a single mutex; caller-visible deliveries fire after the
//! lock is released.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use super::error::{DriverError, DriverResult};
use super::request::{PendingRequest, ResponseSink};
use super::transport::{CloseReason, Transport, TransportError, TransportEvent};
use crate::wire::{RequestMessage, ResponseKind, ResponseMessage};

/// Connection link state.
///
/// The link moves `Disconnected → Connected → Closed`; `Closed` is terminal
/// for the client. There is no reconnect: a new client instance is required
/// after closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Transport not yet established; submissions queue.
    Disconnected,
    /// Transport established; submissions send immediately.
    Connected,
    /// Transport gone; submissions are rejected.
    Closed,
}

/// Point-in-time dispatcher counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientMetrics {
    /// Requests waiting for the connection to be established.
    pub queued: usize,
    /// Requests accepted and not yet completed or terminated.
    pub in_flight: usize,
    /// Requests accepted over the client's lifetime.
    pub total_submitted: u64,
    /// Requests that reached normal completion.
    pub total_completed: u64,
    /// Requests failed by connection loss.
    pub total_terminated: u64,
}

/// Mutable registry state. Single mutation path: every access goes through
/// the dispatcher's mutex.
struct DispatchState {
    link: LinkState,
    /// Correlation ids awaiting the first connect, FIFO.
    queue: VecDeque<String>,
    /// Every accepted, incomplete request, keyed by correlation id.
    pending: HashMap<String, PendingRequest>,
    total_submitted: u64,
    total_completed: u64,
    total_terminated: u64,
}

impl DispatchState {
    fn new() -> Self {
        Self {
            link: LinkState::Disconnected,
            queue: VecDeque::new(),
            pending: HashMap::new(),
            total_submitted: 0,
            total_completed: 0,
            total_terminated: 0,
        }
    }
}

/// Request registry and dispatcher for one client session.
///
/// Requests submitted before the transport connects are queued and flushed
/// in FIFO order on [`on_connected`]; inbound envelopes are routed by
/// correlation id in [`on_message`]; [`on_closed`] fails all outstanding
/// work exactly once.
///
/// [`on_connected`]: RequestDispatcher::on_connected
/// [`on_message`]: RequestDispatcher::on_message
/// [`on_closed`]: RequestDispatcher::on_closed
pub struct RequestDispatcher {
    /// Session identifier, generated once per client lifetime.
    session_id: String,
    /// Whether requests are tagged with the session id.
    use_session: bool,
    transport: Arc<dyn Transport>,
    state: Mutex<DispatchState>,
}

impl RequestDispatcher {
    /// New dispatcher over the given transport.
    ///
    /// When `use_session` is set, every request built by this dispatcher
    /// carries the same freshly generated session id.
    pub fn new(transport: Arc<dyn Transport>, use_session: bool) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            use_session,
            transport,
            state: Mutex::new(DispatchState::new()),
        }
    }

    /// Session identifier attached to requests in session mode.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Whether session mode is enabled.
    pub fn use_session(&self) -> bool {
        self.use_session
    }

    /// Current link state.
    pub fn link_state(&self) -> LinkState {
        self.state.lock().link
    }

    /// Whether the transport is currently connected.
    pub fn is_connected(&self) -> bool {
        self.link_state() == LinkState::Connected
    }

    /// Counter snapshot.
    pub fn metrics(&self) -> ClientMetrics {
        let state = self.state.lock();
        ClientMetrics {
            queued: state.queue.len(),
            in_flight: state.pending.len(),
            total_submitted: state.total_submitted,
            total_completed: state.total_completed,
            total_terminated: state.total_terminated,
        }
    }

    /// Build a request: fresh correlation id, session tag when session mode
    /// is enabled, envelope serialized once.
    ///
    /// Pure construction; the registry and transport are untouched until
    /// [`submit`](RequestDispatcher::submit).
    pub(crate) fn build_request(
        &self,
        script: String,
        sink: ResponseSink,
    ) -> DriverResult<PendingRequest> {
        let id = Uuid::new_v4().to_string();
        let mut message = RequestMessage::eval(&id, &script);
        if self.use_session {
            message = message.with_session(&self.session_id);
        }
        let payload = message.to_bytes()?;
        Ok(PendingRequest::new(id, script, payload, sink))
    }

    /// Accept a request: send it now if connected, queue it otherwise.
    ///
    /// The request is registered under its correlation id in both paths, so
    /// a close while still queued reaches the caller. Never blocks. A
    /// transport send failure is logged and does not fail the submission
    /// (sends are unacknowledged and never retried; the request is
    /// terminated when the transport closes).
    ///
    /// # Errors
    ///
    /// [`DriverError::ClientClosed`] once the link has closed.
    pub(crate) fn submit(&self, request: PendingRequest) -> DriverResult<()> {
        let mut state = self.state.lock();
        match state.link {
            LinkState::Closed => Err(DriverError::ClientClosed),
            LinkState::Connected => {
                let id = request.id().to_string();
                let payload = request.payload();
                state.pending.insert(id.clone(), request);
                state.total_submitted += 1;
                drop(state);

                trace!(request_id = %id, "sending request");
                if let Err(err) = self.transport.send(payload) {
                    warn!(request_id = %id, %err, "transport send failed");
                }
                Ok(())
            }
            LinkState::Disconnected => {
                let id = request.id().to_string();
                state.queue.push_back(id.clone());
                state.pending.insert(id.clone(), request);
                state.total_submitted += 1;
                trace!(request_id = %id, "queued request until connect");
                Ok(())
            }
        }
    }

    /// Transport established: flush the queue strictly in submission order.
    ///
    /// A duplicate `connected` signal, or one arriving after closure, is
    /// ignored.
    pub fn on_connected(&self) {
        let flush = {
            let mut state = self.state.lock();
            if state.link != LinkState::Disconnected {
                debug!(link = ?state.link, "ignoring redundant connected signal");
                return;
            }
            state.link = LinkState::Connected;

            let ids: Vec<String> = state.queue.drain(..).collect();
            ids.into_iter()
                .filter_map(|id| state.pending.get(&id).map(|req| (id, req.payload())))
                .collect::<Vec<(String, Bytes)>>()
        };

        debug!(flushed = flush.len(), "connected, flushing queued requests");
        for (id, payload) in flush {
            if let Err(err) = self.transport.send(payload) {
                warn!(request_id = %id, %err, "transport send failed during flush");
            }
        }
    }

    /// Route one inbound payload to its pending request.
    ///
    /// Payloads that fail to decode, reference an unknown correlation id,
    /// or carry an unrecognized kind are discarded silently; late messages
    /// for already-terminated requests are expected noise.
    pub fn on_message(&self, payload: &[u8]) {
        let message = match ResponseMessage::from_slice(payload) {
            Ok(message) => message,
            Err(err) => {
                trace!(%err, "discarding undecodable message");
                return;
            }
        };

        let mut state = self.state.lock();
        match message.kind {
            ResponseKind::Final => {
                let Some(request) = state.pending.remove(&message.request_id) else {
                    trace!(request_id = %message.request_id, "discarding message for unknown request");
                    return;
                };
                state.total_completed += 1;
                drop(state);
                trace!(request_id = %request.id(), script = %request.script(), "request complete");
                request.complete(message);
            }
            ResponseKind::Partial => {
                let Some(request) = state.pending.get_mut(&message.request_id) else {
                    trace!(request_id = %message.request_id, "discarding message for unknown request");
                    return;
                };
                request.accept_partial(message);
            }
            ResponseKind::Other(code) => {
                trace!(request_id = %message.request_id, code, "ignoring message of unknown kind");
            }
        }
    }

    /// Transport gone: fail every queued and in-flight request exactly once
    /// with a connection-lost error, then refuse further traffic.
    ///
    /// Safe to call with nothing pending, and on repeat.
    pub fn on_closed(&self, reason: CloseReason) {
        let captured = {
            let mut state = self.state.lock();
            state.link = LinkState::Closed;
            state.queue.clear();
            let captured = std::mem::take(&mut state.pending);
            state.total_terminated += captured.len() as u64;
            captured
        };

        if !captured.is_empty() {
            debug!(terminated = captured.len(), %reason, "connection closed, terminating requests");
        }
        for (_, request) in captured {
            request.terminate(DriverError::connection_lost(reason.clone()));
        }
    }

    /// Out-of-band transport fault: logged, never terminates requests.
    /// Termination is driven only by [`on_closed`](RequestDispatcher::on_closed).
    pub fn on_transport_error(&self, error: &TransportError) {
        warn!(%error, "transport reported an error");
    }

    /// Single entry point for the notification pump.
    pub fn handle_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => self.on_connected(),
            TransportEvent::Message(payload) => self.on_message(&payload),
            TransportEvent::Closed(reason) => self.on_closed(reason),
            TransportEvent::Error(error) => self.on_transport_error(&error),
        }
    }
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RequestDispatcher")
            .field("link", &state.link)
            .field("use_session", &self.use_session)
            .field("queued", &state.queue.len())
            .field("in_flight", &state.pending.len())
            .finish()
    }
}
