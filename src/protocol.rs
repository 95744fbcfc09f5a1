//! Wire shapes of the queue backend and their normalization.
//!
//! The backend has drifted over time: the nested player of a queue entry is
//! keyed `User` in some versions and `Player` in others, the timed-queue
//! status endpoint answers either with a bare summary object or with an
//! array of per-entry snapshots, and some responses are wrapped in a
//! `{ "data": ... }` envelope. This module accepts all of those and hands
//! the rest of the crate only the forms in [`crate::model`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::model::{
    ActiveItem, EntryId, NormalizedStatus, Player, PlayerId, QueueEntry, Role, SimulatorId,
    SimulatorQueue, TurnStatus,
};

// ── Push messages ───────────────────────────────────────────────────

/// Wire name of the queue-changed push message.
pub const QUEUE_UPDATE: &str = "QUEUE_UPDATE";
/// Wire name of the timed-queue (turn engine) push message.
pub const TIMED_QUEUE_UPDATE: &str = "TIMED_QUEUE_UPDATE";
/// Wire name of the roster-changed push message.
pub const PLAYER_UPDATE: &str = "PLAYER_UPDATE";

/// The `type` discriminator of a push message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum PushKind {
    QueueUpdate,
    TimedQueueUpdate,
    PlayerUpdate,
    /// A type this client does not route anywhere.
    Other(String),
}

impl PushKind {
    /// Wire name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::QueueUpdate => QUEUE_UPDATE,
            Self::TimedQueueUpdate => TIMED_QUEUE_UPDATE,
            Self::PlayerUpdate => PLAYER_UPDATE,
            Self::Other(other) => other,
        }
    }
}

impl From<String> for PushKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            QUEUE_UPDATE => Self::QueueUpdate,
            TIMED_QUEUE_UPDATE => Self::TimedQueueUpdate,
            PLAYER_UPDATE => Self::PlayerUpdate,
            _ => Self::Other(value),
        }
    }
}

impl std::fmt::Display for PushKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inbound push message.
///
/// Only `type` is interpreted; everything else is kept in `payload` for
/// callers that want it.
#[derive(Debug, Clone, Deserialize)]
pub struct PushMessage {
    #[serde(rename = "type")]
    pub kind: PushKind,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, Value>,
}

impl PushMessage {
    /// Parse a raw text frame.
    ///
    /// # Errors
    ///
    /// Returns [`QueueClientError::Serialization`](crate::QueueClientError::Serialization)
    /// for non-JSON text, non-object JSON, or a missing/non-string `type`.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

// ── Backend records ─────────────────────────────────────────────────

/// `null` and a missing key both mean "use the default".
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A player as the backend serializes it. Every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePlayer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: PlayerId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
}

impl From<WirePlayer> for Player {
    fn from(wire: WirePlayer) -> Self {
        let placeholder = Player::placeholder();
        Self {
            id: wire.id,
            name: wire
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(placeholder.name),
            email: wire.email.unwrap_or_default(),
            role: wire.role.map(Role::from).unwrap_or_default(),
            phone: wire.phone,
            instagram: wire.instagram,
        }
    }
}

/// A queue entry nested under a simulator.
#[derive(Debug, Clone, Deserialize)]
pub struct WireQueueEntry {
    pub id: EntryId,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default, rename = "User", alias = "user")]
    pub user: Option<WirePlayer>,
    #[serde(default, rename = "Player", alias = "player")]
    pub player: Option<WirePlayer>,
}

impl From<WireQueueEntry> for QueueEntry {
    fn from(wire: WireQueueEntry) -> Self {
        let player = match wire.player.or(wire.user) {
            Some(player) => Player::from(player),
            None => {
                warn!(entry_id = wire.id, "queue entry without nested player");
                Player::placeholder()
            }
        };
        Self {
            id: wire.id,
            player,
            position: wire.position,
            placeholder: false,
        }
    }
}

/// A simulator with its nested queue.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSimulator {
    pub id: SimulatorId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub pc_ip: Option<String>,
    #[serde(default, rename = "Queue", alias = "queue")]
    pub queue: Option<Vec<WireQueueEntry>>,
}

impl From<WireSimulator> for SimulatorQueue {
    fn from(wire: WireSimulator) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            pc_ip: wire.pc_ip.filter(|ip| !ip.trim().is_empty()),
            entries: wire
                .queue
                .unwrap_or_default()
                .into_iter()
                .map(QueueEntry::from)
                .collect(),
        }
    }
}

/// One element of the array-shaped status response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireActiveItem {
    #[serde(default)]
    pub id: Option<EntryId>,
    #[serde(default)]
    pub player: Option<WirePlayer>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub time_left: Option<f64>,
    #[serde(default)]
    pub position: Option<i64>,
}

impl From<WireActiveItem> for ActiveItem {
    fn from(wire: WireActiveItem) -> Self {
        let status = TurnStatus::parse(&wire.status).unwrap_or_else(|| {
            warn!(status = %wire.status, "unknown turn status, treating as waiting");
            TurnStatus::Waiting
        });
        Self {
            entry_id: wire.id,
            player: wire.player.map(Player::from).unwrap_or_else(Player::placeholder),
            status,
            time_left_ms: wire.time_left.map(millis_from_wire),
            position: wire.position,
        }
    }
}

/// The object-shaped status response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireQueueStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(default)]
    pub current_player: Option<WirePlayer>,
    #[serde(default)]
    pub time_remaining: Option<f64>,
}

/// Negative or non-finite milliseconds collapse to zero.
fn millis_from_wire(raw: f64) -> u64 {
    if raw.is_finite() && raw > 0.0 {
        // Saturating float-to-int cast.
        raw as u64
    } else {
        0
    }
}

// ── Normalization ───────────────────────────────────────────────────

/// Strip a `{ "data": ... }` envelope if present.
///
/// A status summary object never carries `data`, so an object with a
/// `data` key and no `isActive` key is treated as an envelope.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") && !map.contains_key("isActive") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Detect the status payload's shape and normalize it.
///
/// - array → [`NormalizedStatus::Snapshots`] (malformed elements are skipped)
/// - object with `isActive` and a current player → one synthesized `ACTIVE`
///   snapshot with an unknown entry id
/// - anything else → [`NormalizedStatus::Inactive`]
pub fn normalize_status(value: Value) -> NormalizedStatus {
    match unwrap_envelope(value) {
        Value::Array(items) => NormalizedStatus::Snapshots(
            items
                .into_iter()
                .filter_map(|item| match serde_json::from_value::<WireActiveItem>(item) {
                    Ok(wire) => Some(ActiveItem::from(wire)),
                    Err(e) => {
                        warn!("skipping malformed status item: {e}");
                        None
                    }
                })
                .collect(),
        ),
        Value::Object(map) => match serde_json::from_value::<WireQueueStatus>(Value::Object(map)) {
            Ok(WireQueueStatus {
                is_active: true,
                current_player: Some(player),
                time_remaining,
            }) => NormalizedStatus::Snapshots(vec![ActiveItem {
                entry_id: None,
                player: Player::from(player),
                status: TurnStatus::Active,
                time_left_ms: time_remaining.map(millis_from_wire),
                position: None,
            }]),
            Ok(_) => NormalizedStatus::Inactive,
            Err(e) => {
                warn!("unrecognized status object: {e}");
                NormalizedStatus::Inactive
            }
        },
        Value::Null => NormalizedStatus::Inactive,
        other => {
            warn!(payload = %other, "unrecognized status payload");
            NormalizedStatus::Inactive
        }
    }
}

/// Parse the simulators-with-nested-queue response.
///
/// # Errors
///
/// Returns a serialization error if the body is not a list of simulators.
pub fn parse_simulators(value: Value) -> Result<Vec<SimulatorQueue>> {
    let wire: Vec<WireSimulator> = serde_json::from_value(unwrap_envelope(value))?;
    Ok(wire.into_iter().map(SimulatorQueue::from).collect())
}

/// Parse the player roster response.
///
/// # Errors
///
/// Returns a serialization error if the body is not a list of players.
pub fn parse_players(value: Value) -> Result<Vec<Player>> {
    let wire: Vec<WirePlayer> = serde_json::from_value(unwrap_envelope(value))?;
    Ok(wire.into_iter().map(Player::from).collect())
}

/// Parse a single player record, e.g. the body returned by player creation.
///
/// # Errors
///
/// Returns a serialization error if the body is not a player object.
pub fn parse_player(value: Value) -> Result<Player> {
    let wire: WirePlayer = serde_json::from_value(unwrap_envelope(value))?;
    Ok(Player::from(wire))
}

// ── Request bodies ──────────────────────────────────────────────────

/// Body of the add-to-queue call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToQueueBody {
    pub player_id: PlayerId,
    pub simulator_id: SimulatorId,
    pub time_minutes: u32,
    pub price: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Body of the move-to-position call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveBody {
    pub position: i64,
}

/// Body of the player registration call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlayerBody {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// The staff member who registered the player.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<PlayerId>,
}

/// Body of the login call.
#[derive(Debug, Clone, Serialize)]
pub struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn push_kind_round_trips_known_names() {
        for name in [QUEUE_UPDATE, TIMED_QUEUE_UPDATE, PLAYER_UPDATE] {
            assert_eq!(PushKind::from(name.to_string()).as_str(), name);
        }
        assert_eq!(
            PushKind::from("SIMULATOR_UPDATE".to_string()),
            PushKind::Other("SIMULATOR_UPDATE".into())
        );
    }

    #[test]
    fn push_message_keeps_extra_fields() {
        let msg = PushMessage::parse(r#"{"type":"QUEUE_UPDATE","simulatorId":3}"#).unwrap();
        assert_eq!(msg.kind, PushKind::QueueUpdate);
        assert_eq!(msg.payload.get("simulatorId"), Some(&json!(3)));
    }

    #[test]
    fn negative_time_left_is_clamped() {
        assert_eq!(millis_from_wire(-5.0), 0);
        assert_eq!(millis_from_wire(f64::NAN), 0);
        assert_eq!(millis_from_wire(1500.7), 1500);
    }

    #[test]
    fn status_summary_with_data_key_is_not_unwrapped() {
        let value = json!({"isActive": false, "data": [1, 2]});
        assert!(unwrap_envelope(value.clone()).is_object());
    }

    #[test]
    fn blank_pc_ip_is_dropped() {
        let sims = parse_simulators(json!([{"id": 1, "name": "Sim 1", "pcIp": "  "}])).unwrap();
        assert_eq!(sims[0].pc_ip, None);
        assert!(sims[0].entries.is_empty());
    }

    #[test]
    fn add_body_omits_missing_reason() {
        let body = AddToQueueBody {
            player_id: 1,
            simulator_id: 2,
            time_minutes: 5,
            price: 50,
            reason: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({"playerId": 1, "simulatorId": 2, "timeMinutes": 5, "price": 50})
        );
    }
}
