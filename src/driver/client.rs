//! Client configuration and public API.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::oneshot;
use tracing::debug;

use super::dispatch::{ClientMetrics, LinkState, RequestDispatcher};
use super::error::{DriverError, DriverResult};
use super::request::ResponseSink;
use super::stream::ResultStream;
use super::transport::{Transport, TransportEvent};

/// Default server port.
pub const DEFAULT_PORT: u16 = 8182;

// ============================================================================
// ClientConfig
// ============================================================================

/// Client configuration.
///
/// The endpoint fields describe where the transport adapter should connect;
/// `ssl` selects the encrypted scheme and is a transport concern the driver
/// merely carries. `session` switches every request onto the server's
/// session-scoped processor, sharing one execution context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Endpoint path, empty or starting with `/`.
    pub path: String,
    /// Whether the transport should use the encrypted scheme.
    pub ssl: bool,
    /// Whether session mode is enabled.
    pub session: bool,
}

impl ClientConfig {
    /// New configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder start.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Parse a `ws://host:port/path` or `wss://host:port/path` endpoint.
    ///
    /// The `wss` scheme sets `ssl`; omitted ports default to
    /// [`DEFAULT_PORT`].
    pub fn from_uri(uri: &str) -> DriverResult<Self> {
        let (ssl, rest) = if let Some(rest) = uri.strip_prefix("wss://") {
            (true, rest)
        } else if let Some(rest) = uri.strip_prefix("ws://") {
            (false, rest)
        } else {
            return Err(DriverError::configuration(format!(
                "unsupported scheme in '{uri}'"
            )));
        };

        let (authority, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        if authority.is_empty() {
            return Err(DriverError::configuration(format!("missing host in '{uri}'")));
        }

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse().map_err(|_| {
                    DriverError::configuration(format!("invalid port in '{uri}'"))
                })?;
                (host.to_string(), port)
            }
            None => (authority.to_string(), DEFAULT_PORT),
        };

        Ok(Self {
            host,
            port,
            path: path.to_string(),
            ssl,
            session: false,
        })
    }

    /// Endpoint URL for the transport adapter.
    pub fn url(&self) -> String {
        let scheme = if self.ssl { "wss" } else { "ws" };
        format!("{scheme}://{}:{}{}", self.host, self.port, self.path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            path: String::new(),
            ssl: false,
            session: false,
        }
    }
}

// ============================================================================
// ClientConfigBuilder
// ============================================================================

/// Client configuration builder.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// New builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Server host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Server port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Endpoint path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Encrypted transport scheme.
    pub fn with_ssl(mut self, ssl: bool) -> Self {
        self.config.ssl = ssl;
        self
    }

    /// Session mode.
    pub fn with_session(mut self, session: bool) -> Self {
        self.config.session = session;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

// ============================================================================
// GremlinClient
// ============================================================================

/// A client for one connection to a graph-query server.
///
/// Scripts submitted before the transport connects are queued and flushed
/// in submission order once it does. When the transport closes, every
/// outstanding request fails with [`DriverError::ConnectionLost`] and the
/// client accepts no further traffic; there is no reconnect.
pub struct GremlinClient {
    config: ClientConfig,
    dispatcher: Arc<RequestDispatcher>,
}

impl GremlinClient {
    /// Create a client over the given transport and begin connecting.
    ///
    /// Starts the adapter's connection attempt and spawns the notification
    /// pump that feeds transport events into the dispatcher. Returns
    /// immediately; requests submitted before the `connected` notification
    /// are queued.
    pub fn connect(config: ClientConfig, transport: Arc<dyn Transport>) -> DriverResult<Self> {
        let dispatcher = Arc::new(RequestDispatcher::new(
            Arc::clone(&transport),
            config.session,
        ));

        let mut events = transport.connect()?;
        let pump = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let closed = matches!(event, TransportEvent::Closed(_));
                pump.handle_event(event);
                if closed {
                    break;
                }
            }
            debug!("transport notification channel ended");
        });

        Ok(Self { config, dispatcher })
    }

    /// Execute a script in collecting mode.
    ///
    /// Resolves once the final response envelope arrives, with every
    /// partial fragment plus the final fragment concatenated in arrival
    /// order.
    pub async fn execute(&self, script: impl Into<String>) -> DriverResult<Vec<Value>> {
        let (done, rx) = oneshot::channel();
        let request = self
            .dispatcher
            .build_request(script.into(), ResponseSink::collect(done))?;
        self.dispatcher.submit(request)?;

        rx.await
            .map_err(|_| DriverError::internal("request dropped without a terminal outcome"))?
    }

    /// Execute a script in streaming mode.
    ///
    /// The returned stream yields one page per partial envelope as it
    /// arrives and ends on the final envelope; connection loss surfaces as
    /// an error item.
    pub fn stream(&self, script: impl Into<String>) -> DriverResult<ResultStream> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let request = self
            .dispatcher
            .build_request(script.into(), ResponseSink::stream(tx))?;
        self.dispatcher.submit(request)?;
        Ok(ResultStream::new(rx))
    }

    /// Session identifier, present iff session mode is enabled.
    pub fn session_id(&self) -> Option<&str> {
        self.config
            .session
            .then(|| self.dispatcher.session_id())
    }

    /// Current link state.
    pub fn link_state(&self) -> LinkState {
        self.dispatcher.link_state()
    }

    /// Whether the transport is currently connected.
    pub fn is_connected(&self) -> bool {
        self.dispatcher.is_connected()
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Dispatcher counter snapshot.
    pub fn metrics(&self) -> ClientMetrics {
        self.dispatcher.metrics()
    }
}

impl fmt::Debug for GremlinClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GremlinClient")
            .field("url", &self.config.url())
            .field("session", &self.config.session)
            .field("link", &self.link_state())
            .finish()
    }
}
