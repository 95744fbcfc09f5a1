//! Push transport abstraction.
//!
//! The [`Transport`] trait defines a receive-only text message channel
//! from the backend's push endpoint; the client never writes to it. Every
//! push message is a JSON object carrying a `type` field, so implementations
//! only deal with message framing.
//!
//! # Connection Setup
//!
//! [`LiveSync`](crate::sync::LiveSync) reconnects on its own, so it cannot be
//! handed a single connected transport. Instead it owns a [`Connector`] and
//! calls [`Connector::connect`] once per connection attempt. Connection
//! parameters (URL, TLS, headers) live in the connector.
//!
//! # Implementing a Custom Transport
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use simqueue_client::error::QueueClientError;
//! use simqueue_client::transport::Transport;
//!
//! struct MyTransport { /* ... */ }
//!
//! #[async_trait]
//! impl Transport for MyTransport {
//!     async fn recv(&mut self) -> Option<Result<String, QueueClientError>> {
//!         // Receive the next JSON text message
//!         // Return None when the connection is closed cleanly
//!         todo!()
//!     }
//!
//!     async fn close(&mut self) -> Result<(), QueueClientError> {
//!         // Gracefully shut down the connection
//!         todo!()
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::QueueClientError;

/// An inbound text message transport for the push channel.
///
/// # Cancel Safety
///
/// The [`recv`](Transport::recv) method **MUST** be cancel-safe because it is
/// used inside `tokio::select!`. If `recv` is cancelled before completion,
/// calling it again must not lose data.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Receive the next JSON text message from the backend.
    ///
    /// Returns:
    /// - `Some(Ok(text))`: a complete message was received
    /// - `Some(Err(e))`: a transport error occurred
    /// - `None`: the connection was closed cleanly
    async fn recv(&mut self) -> Option<Result<String, QueueClientError>>;

    /// Close the transport connection gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the graceful shutdown fails. Implementations should
    /// still release resources even if the close handshake fails.
    async fn close(&mut self) -> Result<(), QueueClientError>;
}

#[async_trait]
impl Transport for Box<dyn Transport> {
    async fn recv(&mut self) -> Option<Result<String, QueueClientError>> {
        (**self).recv().await
    }

    async fn close(&mut self) -> Result<(), QueueClientError> {
        (**self).close().await
    }
}

/// Opens push transports on demand.
///
/// An `Err` from [`connect`](Connector::connect) is the "error before open"
/// signal that drives the sync state machine into polling.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Open a new transport connection.
    async fn connect(&self) -> Result<Box<dyn Transport>, QueueClientError>;
}
