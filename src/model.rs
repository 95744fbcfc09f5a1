//! Domain types shared by the board, the view-model and the backends.
//!
//! These are the normalized forms. Wire shapes (with their `User`/`Player`
//! key drift and bare-vs-array status payloads) live in [`crate::protocol`]
//! and are converted exactly once, right after the network call.

use serde::{Deserialize, Serialize};

/// Backend identifier of a player.
pub type PlayerId = u64;

/// Backend identifier of a queue entry.
pub type EntryId = u64;

/// Backend identifier of a simulator.
pub type SimulatorId = u64;

/// Display name used when the backend omits the nested player record.
pub const PLACEHOLDER_PLAYER_NAME: &str = "Sem nome";

/// Account role as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Master,
    Admin,
    Seller,
    /// Any other role string, kept verbatim (plain players use `"PLAYER"`).
    Other(String),
}

impl Role {
    /// Sellers and above may drive simulator PCs (autopilot, session kill).
    pub fn can_operate_simulators(&self) -> bool {
        matches!(self, Self::Master | Self::Admin | Self::Seller)
    }

    /// Wire name of the role.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Master => "MASTER",
            Self::Admin => "ADMIN",
            Self::Seller => "SELLER",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "MASTER" => Self::Master,
            "ADMIN" => Self::Admin,
            "SELLER" => Self::Seller,
            _ => Self::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Other("PLAYER".to_string())
    }
}

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub instagram: Option<String>,
}

impl Player {
    /// Neutral stand-in for a missing nested player record.
    pub fn placeholder() -> Self {
        Self {
            name: PLACEHOLDER_PLAYER_NAME.to_string(),
            ..Self::default()
        }
    }
}

/// One player's place in a simulator's queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub id: EntryId,
    pub player: Player,
    /// Explicit position, when the backend sends one. List order is authoritative otherwise.
    pub position: Option<i64>,
    /// Set on optimistic entries inserted locally before the backend confirms them.
    pub placeholder: bool,
}

/// Lifecycle status tracked by the backend's turn engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnStatus {
    Waiting,
    /// Called to the simulator, waiting for the player to show up.
    Active,
    /// Player arrived and is driving.
    Confirmed,
}

impl TurnStatus {
    /// `ACTIVE` and `CONFIRMED` both occupy the simulator.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Active | Self::Confirmed)
    }

    /// Parse the backend's status string. Unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "WAITING" => Some(Self::Waiting),
            "ACTIVE" => Some(Self::Active),
            "CONFIRMED" => Some(Self::Confirmed),
            _ => None,
        }
    }
}

/// Snapshot of one queue entry's status in the turn engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveItem {
    /// `None` when the backend only reported a bare status summary.
    pub entry_id: Option<EntryId>,
    pub player: Player,
    pub status: TurnStatus,
    pub time_left_ms: Option<u64>,
    pub position: Option<i64>,
}

/// A simulator with its queue, replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorQueue {
    pub id: SimulatorId,
    pub name: String,
    /// PC address for the launcher integration.
    pub pc_ip: Option<String>,
    pub entries: Vec<QueueEntry>,
}

/// Timed-queue status after shape detection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NormalizedStatus {
    /// Nothing is running on the simulator.
    #[default]
    Inactive,
    Snapshots(Vec<ActiveItem>),
}

impl NormalizedStatus {
    /// The snapshots, empty when inactive.
    pub fn items(&self) -> &[ActiveItem] {
        match self {
            Self::Inactive => &[],
            Self::Snapshots(items) => items,
        }
    }

    /// Consume into the snapshot list.
    pub fn into_items(self) -> Vec<ActiveItem> {
        match self {
            Self::Inactive => Vec::new(),
            Self::Snapshots(items) => items,
        }
    }
}
