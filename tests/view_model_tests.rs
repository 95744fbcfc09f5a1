#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
//! Queue view-model derivation through the wire path.
//!
//! Payloads are built as the backend sends them and parsed with the crate's
//! own normalization, so these tests cover the full "JSON in, who is
//! playing out" path.

mod common;

use serde_json::json;
use simqueue_client::countdown::format_time;
use simqueue_client::model::{ActiveItem, QueueEntry};
use simqueue_client::view_model::{derive, DerivedView, MoveDirection};
use simqueue_client::TurnStatus;

use common::{active_item_json, entry_json, simulator_json, simulators_from, status_from};

fn entries_of(value: serde_json::Value) -> Vec<QueueEntry> {
    simulators_from(value).remove(0).entries
}

fn ids(view: &DerivedView) -> Vec<u64> {
    view.upcoming.iter().map(|upcoming| upcoming.entry.id).collect()
}

/// Every entry lands in exactly one of `current` / `upcoming`.
fn assert_partition(entries: &[QueueEntry], view: &DerivedView) {
    let mut seen: Vec<u64> = ids(view);
    if let Some(current) = &view.current {
        seen.push(current.entry.id);
    }
    seen.sort_unstable();
    let mut expected: Vec<u64> = entries.iter().map(|entry| entry.id).collect();
    expected.sort_unstable();
    assert_eq!(seen, expected);
}

fn three_waiting() -> (Vec<QueueEntry>, Vec<ActiveItem>) {
    let entries = entries_of(json!([simulator_json(
        1,
        "Sim 1",
        vec![
            entry_json(10, 100, "Ana"),
            entry_json(11, 101, "Bruno"),
            entry_json(12, 102, "Carla"),
        ]
    )]));
    let active = status_from(json!([
        active_item_json(10, 100, "WAITING", None, 2),
        active_item_json(11, 101, "WAITING", None, 5),
        active_item_json(12, 102, "WAITING", None, 9),
    ]))
    .into_items();
    (entries, active)
}

// ════════════════════════════════════════════════════════════════════
// Scenarios
// ════════════════════════════════════════════════════════════════════

#[test]
fn idle_simulator_has_everyone_upcoming() {
    let entries = entries_of(json!([{ "id": 1, "Queue": [{ "id": 10, "Player": { "id": 100, "name": "Ana" } }] }]));
    let view = derive(&entries, &status_from(json!([])).into_items());

    assert!(view.current.is_none());
    assert_eq!(ids(&view), vec![10]);
    assert_eq!(view.upcoming[0].entry.player.name, "Ana");
    assert!(!view.upcoming[0].can_move_up);
    assert!(!view.upcoming[0].can_move_down);
}

#[test]
fn confirmed_player_is_current_with_countdown() {
    let entries = entries_of(json!([{ "id": 1, "Queue": [{ "id": 10, "Player": { "id": 100, "name": "Ana" } }] }]));
    let active = status_from(json!([{
        "id": 10,
        "player": { "id": 100 },
        "status": "CONFIRMED",
        "timeLeft": 30000
    }]))
    .into_items();

    let view = derive(&entries, &active);
    let current = view.current.as_ref().expect("Ana is playing");
    assert_eq!(current.entry.id, 10);
    assert_eq!(current.entry.player.name, "Ana");
    assert!(current.is_playing());
    assert!(!current.can_confirm());
    assert_eq!(current.countdown().as_deref(), Some("0:30"));
    assert!(view.upcoming.is_empty());
}

#[test]
fn called_player_can_be_confirmed() {
    let (entries, mut active) = three_waiting();
    active[1].status = TurnStatus::Active;
    active[1].time_left_ms = Some(125_000);

    let view = derive(&entries, &active);
    let current = view.current.as_ref().unwrap();
    assert_eq!(current.entry.id, 11);
    assert!(current.can_confirm());
    assert_eq!(current.active_entry_id, Some(11));
    assert_eq!(current.countdown().as_deref(), Some("2:05"));
    assert_eq!(ids(&view), vec![10, 12]);
}

#[test]
fn correlation_uses_player_id_not_entry_id() {
    let entries = entries_of(json!([simulator_json(
        1,
        "Sim 1",
        vec![entry_json(10, 100, "Ana"), entry_json(11, 101, "Bruno")]
    )]));
    // The turn engine keys its snapshot differently from the queue feed.
    let active = status_from(json!([active_item_json(
        900,
        101,
        "CONFIRMED",
        Some(60_000),
        1
    )]))
    .into_items();

    let view = derive(&entries, &active);
    assert_eq!(view.current.as_ref().unwrap().entry.id, 11);
    assert_eq!(ids(&view), vec![10]);
}

#[test]
fn bare_status_object_marks_current_player_without_confirm() {
    let entries = entries_of(json!([simulator_json(
        1,
        "Sim 1",
        vec![entry_json(10, 100, "Ana"), entry_json(11, 101, "Bruno")]
    )]));
    let active = status_from(json!({
        "data": { "isActive": true, "currentPlayer": { "id": 100, "name": "Ana" }, "timeRemaining": 59000 }
    }))
    .into_items();

    let view = derive(&entries, &active);
    let current = view.current.as_ref().unwrap();
    assert_eq!(current.entry.id, 10);
    assert!(!current.can_confirm(), "entry id unknown in bare status");
    assert_eq!(current.countdown().as_deref(), Some("0:59"));
}

// ════════════════════════════════════════════════════════════════════
// Degradation
// ════════════════════════════════════════════════════════════════════

#[test]
fn two_live_items_take_first_in_list_order() {
    let (entries, mut active) = three_waiting();
    active[2].status = TurnStatus::Confirmed;
    active[0].status = TurnStatus::Active;

    let view = derive(&entries, &active);
    assert_eq!(view.current.as_ref().unwrap().entry.id, 10);
    assert_partition(&entries, &view);
}

#[test]
fn live_item_for_unknown_player_leaves_no_current() {
    let (entries, _) = three_waiting();
    let active = status_from(json!([active_item_json(99, 999, "ACTIVE", Some(1_000), 1)])).into_items();

    let view = derive(&entries, &active);
    assert!(view.current.is_none());
    assert_eq!(ids(&view), vec![10, 11, 12]);
}

#[test]
fn missing_nested_player_never_becomes_current() {
    let entries = entries_of(json!([{ "id": 1, "Queue": [{ "id": 10 }, { "id": 11, "User": { "id": 5, "name": "Dani" } }] }]));
    assert_eq!(entries[0].player.name, "Sem nome");
    assert_eq!(entries[1].player.name, "Dani");

    let active = status_from(json!([{ "id": 10, "status": "ACTIVE", "timeLeft": 5000 }])).into_items();
    let view = derive(&entries, &active);
    assert!(view.current.is_none());
    assert_partition(&entries, &view);
}

#[test]
fn partition_holds_for_every_live_choice() {
    let (entries, base) = three_waiting();
    for index in 0..base.len() {
        for status in [TurnStatus::Active, TurnStatus::Confirmed] {
            let mut active = base.clone();
            active[index].status = status;
            let view = derive(&entries, &active);
            assert_eq!(view.current.as_ref().unwrap().entry.id, entries[index].id);
            assert_partition(&entries, &view);
            assert_eq!(view.len(), entries.len());
        }
    }
    let view = derive(&entries, &base);
    assert!(view.current.is_none());
    assert_eq!(ids(&view), vec![10, 11, 12]);
}

// ════════════════════════════════════════════════════════════════════
// Move affordances
// ════════════════════════════════════════════════════════════════════

#[test]
fn ends_of_upcoming_cannot_move_outward() {
    let (entries, active) = three_waiting();
    let view = derive(&entries, &active);

    assert!(!view.upcoming[0].can_move_up);
    assert!(view.upcoming[0].can_move_down);
    assert!(view.upcoming[1].can_move_up && view.upcoming[1].can_move_down);
    assert!(view.upcoming[2].can_move_up);
    assert!(!view.upcoming[2].can_move_down);

    assert_eq!(view.move_target(10, MoveDirection::Up), None);
    assert_eq!(view.move_target(12, MoveDirection::Down), None);
}

#[test]
fn move_targets_use_neighbour_backend_position() {
    let (entries, active) = three_waiting();
    let view = derive(&entries, &active);

    // Positions have gaps (2, 5, 9): the target is the neighbour's, not ±1.
    assert_eq!(view.move_target(11, MoveDirection::Up), Some(2));
    assert_eq!(view.move_target(11, MoveDirection::Down), Some(9));
    assert_eq!(view.move_target(10, MoveDirection::Down), Some(5));
}

#[test]
fn playing_entry_cannot_be_moved() {
    let (entries, mut active) = three_waiting();
    active[0].status = TurnStatus::Confirmed;
    let view = derive(&entries, &active);

    assert_eq!(view.move_target(10, MoveDirection::Down), None);
    // The first waiting entry is now Bruno.
    assert!(!view.upcoming[0].can_move_up);
    assert_eq!(view.move_target(12, MoveDirection::Up), Some(5));
}

#[test]
fn explicit_entry_positions_are_used_without_snapshots() {
    let entries = entries_of(json!([{ "id": 1, "Queue": [
        { "id": 10, "position": 4, "Player": { "id": 100, "name": "Ana" } },
        { "id": 11, "position": 8, "Player": { "id": 101, "name": "Bruno" } }
    ] }]));
    let view = derive(&entries, &[]);
    assert_eq!(view.move_target(10, MoveDirection::Down), Some(8));
    assert_eq!(view.move_target(11, MoveDirection::Up), Some(4));
}

// ════════════════════════════════════════════════════════════════════
// Countdown formatting
// ════════════════════════════════════════════════════════════════════

#[test]
fn format_time_examples() {
    assert_eq!(format_time(125_000), "2:05");
    assert_eq!(format_time(0), "0:00");
    assert_eq!(format_time(59_000), "0:59");
}

#[test]
fn waiting_and_expired_items_show_no_countdown() {
    let (entries, mut active) = three_waiting();
    active[0].status = TurnStatus::Confirmed;
    active[0].time_left_ms = Some(0);
    let view = derive(&entries, &active);
    assert_eq!(view.current.as_ref().unwrap().countdown(), None);
}
