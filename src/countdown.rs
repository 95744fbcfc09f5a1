//! Local countdown between authoritative refreshes.
//!
//! The turn engine owns the real clock. Between refreshes the client only
//! decrements live items so the display keeps moving; the next refresh
//! overwrites whatever was decremented here.

use std::time::Duration;

use crate::model::{ActiveItem, TurnStatus};

/// How often, and by how much, the local countdown advances.
pub const COUNTDOWN_STEP: Duration = Duration::from_secs(1);

/// Render milliseconds as `m:ss`.
///
/// ```
/// use simqueue_client::countdown::format_time;
///
/// assert_eq!(format_time(125_000), "2:05");
/// assert_eq!(format_time(0), "0:00");
/// ```
pub fn format_time(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    format!("{minutes}:{seconds:02}")
}

/// Countdown text for an item, or `None` when nothing should be shown.
///
/// Only `ACTIVE`/`CONFIRMED` items with a non-zero remaining time display a
/// countdown.
pub fn countdown_label(status: TurnStatus, time_left_ms: Option<u64>) -> Option<String> {
    match time_left_ms {
        Some(ms) if status.is_live() && ms > 0 => Some(format_time(ms)),
        _ => None,
    }
}

/// Advance every live item by `step`, flooring at zero.
///
/// Returns `true` if any item changed.
pub fn tick(items: &mut [ActiveItem], step: Duration) -> bool {
    let step_ms = u64::try_from(step.as_millis()).unwrap_or(u64::MAX);
    let mut changed = false;
    for item in items.iter_mut().filter(|item| item.status.is_live()) {
        if let Some(left) = item.time_left_ms.as_mut() {
            if *left > 0 {
                *left = left.saturating_sub(step_ms);
                changed = true;
            }
        }
    }
    changed
}
