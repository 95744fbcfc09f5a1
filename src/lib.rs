//! # SimQueue Client
//!
//! Async Rust client for the front desk of a racing-simulator rental shop.
//!
//! The crate keeps a local copy of every simulator's queue eventually
//! consistent with the backend and derives "who is driving, who is next"
//! from it.
//!
//! ## Features
//!
//! - **Push with polling fallback**: [`LiveSync`] prefers a push channel and
//!   falls back to per-topic poll timers while reconnecting with backoff
//! - **Transport-agnostic**: implement [`Transport`] and [`Connector`] for
//!   any push backend; WebSocket is built in (`transport-websocket`)
//! - **Pure view-model**: [`view_model::derive`] partitions a queue into the
//!   current turn and the upcoming entries, with move affordances
//! - **Sequenced refreshes**: [`QueueBoard`] never applies a response older
//!   than one it already applied
//! - **REST and launcher clients** over `reqwest` (`http-reqwest`)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # #[cfg(all(feature = "transport-websocket", feature = "http-reqwest"))]
//! # async fn example() -> simqueue_client::Result<()> {
//! use std::sync::Arc;
//! use simqueue_client::{
//!     ClientConfig, HttpBackend, LiveSync, MemorySessionStore, QueueBoard, SyncConfig,
//!     SyncEvent, Topic, WebSocketConnector,
//! };
//!
//! let config = ClientConfig::from_env()?;
//! let session = Arc::new(MemorySessionStore::new());
//! let backend = Arc::new(HttpBackend::new(&config, session.clone())?);
//! let board = Arc::new(QueueBoard::new(backend, session));
//!
//! let sync_config = SyncConfig::new()
//!     .with_topic(Topic::queue(board.queue_refresher()))
//!     .with_topic(Topic::roster(board.roster_refresher()));
//! let (mut sync, mut events) =
//!     LiveSync::start(WebSocketConnector::new(&config.push_url), sync_config);
//!
//! board.refresh_queues().await?;
//! while let Some(event) = events.recv().await {
//!     if let SyncEvent::Message(_) = event {
//!         for sim in board.views().await {
//!             println!("{}: {} waiting", sim.simulator.name, sim.view.upcoming.len());
//!         }
//!     }
//! }
//! sync.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod board;
pub mod config;
pub mod countdown;
pub mod error;
pub mod event;
#[cfg(feature = "http-reqwest")]
pub mod http;
pub mod launcher;
pub mod model;
pub mod protocol;
pub mod session;
pub mod sync;
pub mod transport;
pub mod transports;
pub mod view_model;

// Re-export primary types for ergonomic imports.
pub use backend::Backend;
pub use board::{AddToQueue, NewPlayer, Notice, NoticeLevel, QueueBoard, SimulatorView};
pub use config::ClientConfig;
pub use error::{QueueClientError, Result};
pub use event::{SyncEvent, SyncState};
#[cfg(feature = "http-reqwest")]
pub use http::{HttpBackend, HttpLauncher};
pub use launcher::Launcher;
pub use model::{ActiveItem, NormalizedStatus, Player, QueueEntry, SimulatorQueue, TurnStatus};
pub use protocol::{PushKind, PushMessage};
pub use session::{MemorySessionStore, Session, SessionStore, SessionUser};
pub use sync::{LiveSync, Refresh, SyncConfig, Topic};
pub use transport::{Connector, Transport};
#[cfg(feature = "transport-websocket")]
pub use transports::{WebSocketConnector, WebSocketTransport};
pub use view_model::{CurrentTurn, DerivedView, MoveDirection, UpcomingEntry};
