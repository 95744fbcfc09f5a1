//! Events emitted by [`LiveSync`](crate::sync::LiveSync).

use crate::protocol::PushKind;

/// Connection state of the live update channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncState {
    /// First connection attempt in progress; no refresh mechanism yet.
    Connecting,
    /// Push channel open; poll timers are stopped.
    Connected,
    /// Push channel unavailable; poll timers drive refreshes while
    /// reconnection is attempted with backoff.
    DegradedPolling,
    /// Torn down by the owner. Terminal.
    Closed,
}

impl SyncState {
    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Self::Connecting => 0,
            Self::Connected => 1,
            Self::DegradedPolling => 2,
            Self::Closed => 3,
        }
    }

    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Connecting,
            1 => Self::Connected,
            2 => Self::DegradedPolling,
            _ => Self::Closed,
        }
    }
}

/// Something the owning view may want to react to.
///
/// Channel problems never show up here as errors, only as state changes.
/// Refresh failures are reported so the view can show a dismissable notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    StateChanged(SyncState),
    /// A well-formed push message arrived.
    Message(PushKind),
    /// A topic's refresh callback returned an error.
    RefreshFailed {
        topic: String,
        message: String,
    },
    /// The channel was torn down. Always the last event.
    Closed,
}
