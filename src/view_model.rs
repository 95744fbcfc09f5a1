//! Derivation of "who is playing, who is next" for one simulator.
//!
//! [`derive`] is a pure function of the simulator's queue entries and the
//! turn engine's snapshots. It is re-run on every refresh and never mutated
//! in place.

use tracing::warn;

use crate::countdown::countdown_label;
use crate::model::{ActiveItem, EntryId, PlayerId, QueueEntry, TurnStatus};

/// Direction of a reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// The entry occupying the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentTurn {
    pub entry: QueueEntry,
    pub status: TurnStatus,
    pub time_left_ms: Option<u64>,
    /// Entry id as reported by the turn engine, used for confirm calls.
    pub active_entry_id: Option<EntryId>,
}

impl CurrentTurn {
    /// The player was called but has not been confirmed yet.
    pub fn can_confirm(&self) -> bool {
        self.status == TurnStatus::Active && self.active_entry_id.is_some()
    }

    /// The player is driving.
    pub fn is_playing(&self) -> bool {
        self.status == TurnStatus::Confirmed
    }

    /// `m:ss` remaining, if there is anything to show.
    pub fn countdown(&self) -> Option<String> {
        countdown_label(self.status, self.time_left_ms)
    }
}

/// A waiting entry with its affordances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingEntry {
    pub entry: QueueEntry,
    pub can_move_up: bool,
    pub can_move_down: bool,
    /// Absolute backend position of this entry, used as a move target by its neighbours.
    pub position: i64,
}

/// Presentation model of one simulator's queue.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DerivedView {
    pub current: Option<CurrentTurn>,
    pub upcoming: Vec<UpcomingEntry>,
}

impl DerivedView {
    /// Backend position to send when moving `entry_id` one step.
    ///
    /// Returns `None` when the move is disabled (first entry moving up, last
    /// moving down, a placeholder, or an entry that is not waiting).
    /// Placeholders are skipped when looking for the neighbour.
    pub fn move_target(&self, entry_id: EntryId, direction: MoveDirection) -> Option<i64> {
        let movable: Vec<&UpcomingEntry> = self
            .upcoming
            .iter()
            .filter(|upcoming| !upcoming.entry.placeholder)
            .collect();
        let index = movable
            .iter()
            .position(|upcoming| upcoming.entry.id == entry_id)?;
        let neighbour = match direction {
            MoveDirection::Up => index.checked_sub(1)?,
            MoveDirection::Down => index.checked_add(1)?,
        };
        movable.get(neighbour).map(|upcoming| upcoming.position)
    }

    /// Total number of entries across `current` and `upcoming`.
    pub fn len(&self) -> usize {
        self.upcoming.len() + usize::from(self.current.is_some())
    }

    /// `true` when the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the view for one simulator.
///
/// The live snapshot is the first `ACTIVE`/`CONFIRMED` item in list order.
/// It is matched to a queue entry by player id, because the snapshot feed
/// and the queue feed are keyed independently. `upcoming` is every other
/// entry in original order, so `current` and `upcoming` always partition
/// `entries`.
pub fn derive(entries: &[QueueEntry], active: &[ActiveItem]) -> DerivedView {
    let mut live = active.iter().filter(|item| item.status.is_live());
    let live_item = live.next();
    if live.next().is_some() {
        warn!("more than one live turn reported, using the first");
    }

    let current_index = live_item.and_then(|item| {
        if item.player.id == 0 {
            return None;
        }
        entries
            .iter()
            .position(|entry| entry.player.id == item.player.id)
    });

    let current = current_index
        .and_then(|index| entries.get(index))
        .zip(live_item)
        .map(|(entry, item)| CurrentTurn {
            entry: entry.clone(),
            status: item.status,
            time_left_ms: item.time_left_ms,
            active_entry_id: item.entry_id,
        });

    let waiting: Vec<(usize, &QueueEntry)> = entries
        .iter()
        .enumerate()
        .filter(|(index, _)| Some(*index) != current_index)
        .collect();
    // Placeholders are local-only rows: they never move and are never a
    // neighbour to swap with.
    let movable = waiting.iter().filter(|(_, entry)| !entry.placeholder).count();
    let mut rank = 0;

    let upcoming = waiting
        .iter()
        .map(|(queue_index, entry)| {
            let (can_move_up, can_move_down) = if entry.placeholder {
                (false, false)
            } else {
                rank += 1;
                (rank > 1, rank < movable)
            };
            UpcomingEntry {
                entry: (*entry).clone(),
                can_move_up,
                can_move_down,
                position: resolve_position(entry, *queue_index, active),
            }
        })
        .collect();

    DerivedView { current, upcoming }
}

/// Backend numbering may have gaps, so prefer the turn engine's position,
/// then the entry's own, then the 1-based list slot.
fn resolve_position(entry: &QueueEntry, queue_index: usize, active: &[ActiveItem]) -> i64 {
    snapshot_for(entry.id, entry.player.id, active)
        .and_then(|item| item.position)
        .or(entry.position)
        .unwrap_or_else(|| i64::try_from(queue_index).map_or(i64::MAX, |i| i + 1))
}

fn snapshot_for(
    entry_id: EntryId,
    player_id: PlayerId,
    active: &[ActiveItem],
) -> Option<&ActiveItem> {
    active
        .iter()
        .find(|item| item.entry_id == Some(entry_id))
        .or_else(|| {
            active.iter().find(|item| {
                item.status == TurnStatus::Waiting && player_id != 0 && item.player.id == player_id
            })
        })
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
    use crate::model::Player;

    fn entry(id: EntryId, player_id: PlayerId, name: &str) -> QueueEntry {
        QueueEntry {
            id,
            player: Player {
                id: player_id,
                name: name.into(),
                ..Player::default()
            },
            position: None,
            placeholder: false,
        }
    }

    fn snapshot(
        entry_id: EntryId,
        player_id: PlayerId,
        status: TurnStatus,
        position: i64,
    ) -> ActiveItem {
        ActiveItem {
            entry_id: Some(entry_id),
            player: Player {
                id: player_id,
                ..Player::default()
            },
            status,
            time_left_ms: None,
            position: Some(position),
        }
    }

    #[test]
    fn unknown_player_id_never_correlates() {
        let entries = vec![entry(1, 0, "ghost")];
        let active = vec![ActiveItem {
            entry_id: None,
            player: Player::placeholder(),
            status: TurnStatus::Active,
            time_left_ms: None,
            position: None,
        }];
        let view = derive(&entries, &active);
        assert!(view.current.is_none());
        assert_eq!(view.upcoming.len(), 1);
    }

    #[test]
    fn duplicate_player_keeps_partition() {
        let entries = vec![entry(1, 7, "Bia"), entry(2, 7, "Bia")];
        let active = vec![snapshot(1, 7, TurnStatus::Confirmed, 1)];
        let view = derive(&entries, &active);
        assert_eq!(view.current.as_ref().unwrap().entry.id, 1);
        assert_eq!(view.upcoming.len(), 1);
        assert_eq!(view.upcoming[0].entry.id, 2);
        assert_eq!(view.len(), entries.len());
    }

    #[test]
    fn positions_fall_back_to_list_slot() {
        let entries = vec![entry(1, 1, "A"), entry(2, 2, "B"), entry(3, 3, "C")];
        let view = derive(&entries, &[]);
        let positions: Vec<i64> = view.upcoming.iter().map(|u| u.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[test]
    fn move_target_for_missing_entry_is_none() {
        let view = derive(&[entry(1, 1, "A")], &[]);
        assert_eq!(view.move_target(99, MoveDirection::Up), None);
    }

    #[test]
    fn placeholders_are_not_move_neighbours() {
        let mut pending = entry(u64::MAX, 9, "Novo");
        pending.placeholder = true;
        let entries = vec![entry(1, 1, "A"), pending, entry(2, 2, "B")];
        let view = derive(&entries, &[]);

        let flags: Vec<(bool, bool)> = view
            .upcoming
            .iter()
            .map(|u| (u.can_move_up, u.can_move_down))
            .collect();
        assert_eq!(flags, vec![(false, true), (false, false), (true, false)]);
        assert_eq!(view.move_target(1, MoveDirection::Down), Some(3));
        assert_eq!(view.move_target(2, MoveDirection::Up), Some(1));
        assert_eq!(view.move_target(u64::MAX, MoveDirection::Up), None);
    }

    #[test]
    fn trailing_placeholder_does_not_enable_move_down() {
        let mut pending = entry(u64::MAX, 9, "Novo");
        pending.placeholder = true;
        let view = derive(&[entry(1, 1, "A"), pending], &[]);
        assert!(!view.upcoming[0].can_move_down);
        assert_eq!(view.move_target(1, MoveDirection::Down), None);
    }

    #[test]
    fn confirm_requires_known_entry_id() {
        let entries = vec![entry(1, 5, "Caio")];
        let mut item = snapshot(1, 5, TurnStatus::Active, 1);
        item.entry_id = None;
        let view = derive(&entries, &[item]);
        assert!(!view.current.unwrap().can_confirm());
    }
}
