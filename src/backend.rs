//! REST surface of the queue backend.
//!
//! The board only ever talks to the backend through [`Backend`], so the
//! HTTP client ([`HttpBackend`](crate::http::HttpBackend), feature
//! `http-reqwest`) can be swapped for an in-memory double in tests.
//!
//! Mutating calls are fire-and-refresh: their response bodies are never
//! treated as state. Callers refresh afterwards. Player creation hands the
//! created record back so the caller can select it, but the roster still
//! comes from a refresh.

use async_trait::async_trait;

use crate::error::{QueueClientError, Result};
use crate::model::{EntryId, NormalizedStatus, Player, SimulatorId, SimulatorQueue};
use crate::protocol::{AddToQueueBody, CreatePlayerBody};

/// Calls the board needs from the queue backend.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Every simulator with its nested queue.
    async fn fetch_simulators(&self) -> Result<Vec<SimulatorQueue>>;

    /// Turn engine status of one simulator, already normalized.
    async fn fetch_status(&self, simulator: SimulatorId) -> Result<NormalizedStatus>;

    /// The player roster.
    async fn fetch_players(&self) -> Result<Vec<Player>>;

    /// Register a new player and return the created record.
    async fn create_player(&self, body: &CreatePlayerBody) -> Result<Player>;

    async fn add_to_queue(&self, body: &AddToQueueBody) -> Result<()>;

    async fn remove_from_queue(&self, entry: EntryId) -> Result<()>;

    /// Move an entry to an absolute backend position.
    async fn move_to_position(&self, entry: EntryId, position: i64) -> Result<()>;

    /// Mark a called player as arrived.
    async fn confirm_turn(&self, entry: EntryId) -> Result<()>;

    /// End the current turn and call the next player.
    async fn advance(&self, simulator: SimulatorId) -> Result<()>;

    /// Start the turn engine on a simulator whose queue is idle.
    async fn start_turns(&self, simulator: SimulatorId) -> Result<()>;

    /// Report that a called player never showed up.
    async fn mark_missed(&self, entry: EntryId) -> Result<()>;
}

/// Reject the zero id before it reaches the network.
///
/// # Errors
///
/// Returns [`QueueClientError::Validation`] when `id` is 0.
pub fn require_id(what: &str, id: u64) -> Result<u64> {
    if id == 0 {
        return Err(QueueClientError::Validation(format!("{what} id must be > 0")));
    }
    Ok(id)
}
