//! Driver Module
//!
//! The request lifecycle layer: clients build uniquely identified script
//! requests, the dispatcher queues or sends them, and inbound response
//! envelopes are correlated back to the caller that issued each request.
//!
//! # Example
//!
//! ```ignore
//! use gremlin_driver::{ClientConfig, GremlinClient};
//!
//! // Transport adapter implementing `Transport` (e.g. a WebSocket).
//! let transport = my_websocket_adapter(&config.url());
//!
//! let config = ClientConfig::builder()
//!     .with_host("localhost")
//!     .with_port(8182)
//!     .build();
//! let client = GremlinClient::connect(config, transport)?;
//!
//! // Collecting mode: one aggregate result.
//! let items = client.execute("g.V().limit(10)").await?;
//!
//! // Streaming mode: a page per partial response.
//! let mut results = client.stream("g.V()")?;
//! while let Some(page) = results.next().await {
//!     for item in page? {
//!         println!("{item}");
//!     }
//! }
//! ```

mod client;
mod dispatch;
mod error;
mod request;
mod stream;
pub mod transport;

// Re-exports
pub use client::{ClientConfig, ClientConfigBuilder, GremlinClient, DEFAULT_PORT};
pub use dispatch::{ClientMetrics, LinkState, RequestDispatcher};
pub use error::{DriverError, DriverResult};
pub use request::ConsumptionMode;
pub use stream::{ResultPage, ResultStream};
pub use transport::{CloseReason, Transport, TransportError, TransportEvent};
