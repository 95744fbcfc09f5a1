//! Push transport implementations.
//!
//! Concrete [`Transport`](crate::Transport) and [`Connector`](crate::Connector)
//! implementations live behind feature gates:
//!
//! | Feature                | Types                                         |
//! |------------------------|-----------------------------------------------|
//! | `transport-websocket`  | [`WebSocketTransport`], [`WebSocketConnector`] |
//!
//! # Example
//!
//! ```rust,ignore
//! # async fn example() -> Result<(), simqueue_client::QueueClientError> {
//! use simqueue_client::{Connector, WebSocketConnector};
//!
//! let connector = WebSocketConnector::new("ws://localhost:8080");
//! let mut ws = connector.connect().await?;
//!
//! if let Some(Ok(msg)) = ws.recv().await {
//!     println!("backend pushed: {msg}");
//! }
//!
//! ws.close().await?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "transport-websocket")]
pub mod websocket;

#[cfg(feature = "transport-websocket")]
pub use websocket::{WebSocketConnector, WebSocketTransport};
