//! # Gremlin Driver
//!
//! A Rust driver for Gremlin-compatible graph servers: traversal scripts go
//! out over a persistent message transport, and asynchronous, possibly
//! multi-part responses are correlated back to the caller that issued each
//! request.
//!
//! ## Features
//!
//! - **Request correlation** - every request carries a unique id that the
//!   server echoes on each response envelope, so concurrent requests share
//!   one connection safely
//! - **Pre-connection queuing** - requests submitted before the transport
//!   connects are queued and flushed in submission order
//! - **Two consumption modes** - collect a whole result set in one await, or
//!   stream pages as they arrive
//! - **Session mode** - optionally pin all requests to one server-side
//!   execution context
//! - **Pluggable transport** - the physical connection (typically a
//!   WebSocket) lives behind a small trait; the driver never touches sockets
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gremlin_driver::{ClientConfig, GremlinClient, Transport};
//!
//! # async fn example(transport: Arc<dyn Transport>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::builder()
//!     .with_host("localhost")
//!     .with_port(8182)
//!     .build();
//!
//! let client = GremlinClient::connect(config, transport)?;
//!
//! // Collecting mode: resolves once the final response arrives.
//! let items = client.execute("g.V().limit(10)").await?;
//! for item in items {
//!     println!("{item}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Streaming
//!
//! For large or open-ended result sets, consume pages as they arrive:
//!
//! ```rust,no_run
//! # use gremlin_driver::GremlinClient;
//! use tokio_stream::StreamExt;
//!
//! # async fn example(client: GremlinClient) -> Result<(), Box<dyn std::error::Error>> {
//! let mut results = client.stream("g.V()")?;
//! while let Some(page) = results.next().await {
//!     for item in page? {
//!         println!("{item}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Session Mode
//!
//! ```rust
//! use gremlin_driver::ClientConfig;
//!
//! let config = ClientConfig::builder().with_session(true).build();
//! assert!(config.session);
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`DriverResult`]. When the transport closes, every
//! queued and in-flight request fails with [`DriverError::ConnectionLost`]
//! carrying the close reason; the client is then terminal and a new instance
//! is required.
//!
//! ## Modules
//!
//! - [`driver`] - client, dispatcher, transport seam, and result streams
//! - [`wire`] - low-level message envelope types

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod driver;
pub mod wire;

// Re-exports for convenience
pub use driver::{
    ClientConfig, ClientConfigBuilder, ClientMetrics, CloseReason, ConsumptionMode,
    DriverError, DriverResult, GremlinClient, LinkState, RequestDispatcher, ResultPage,
    ResultStream, Transport, TransportError, TransportEvent, DEFAULT_PORT,
};

pub use wire::{RequestMessage, ResponseKind, ResponseMessage};

/// Config alias for convenience
pub type Config = ClientConfig;
