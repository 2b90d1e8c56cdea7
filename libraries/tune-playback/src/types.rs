//! Core types for the playing queue and the published session state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tune_core::Track;
use tune_artwork::ArtworkImages;

/// One entry of the playing queue.
///
/// Queues never change after they are built, so the item's position at build
/// time doubles as its `queue_id`. The `media_id` is hierarchy-aware: it
/// records which browse category the queue was built from, not just which
/// track this is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Stable id of this entry within its queue (the build index)
    pub queue_id: u64,

    /// Hierarchy-aware media id, e.g. `__BY_ALBUM__/<album>|<track id>`
    pub media_id: String,

    /// Eagerly resolved track metadata
    pub track: Track,
}

/// Repeat behavior applied when a track finishes on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatMode {
    /// Advance; stop when the queue runs out
    None,

    /// Advance; wrap to the first item after the last
    All,

    /// Replay the current item forever
    Current,
}

impl RepeatMode {
    /// Wire value used by the repeat custom action.
    pub fn as_ordinal(self) -> u8 {
        match self {
            Self::None => 0,
            Self::All => 1,
            Self::Current => 2,
        }
    }

    /// Inverse of [`RepeatMode::as_ordinal`]; unknown values are rejected.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(Self::None),
            1 => Some(Self::All),
            2 => Some(Self::Current),
            _ => None,
        }
    }
}

impl Default for RepeatMode {
    fn default() -> Self {
        Self::None
    }
}

/// Playback engine state as published to controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing loaded, nothing to resume
    None,

    /// A track is being prepared
    Buffering,

    /// Audio is audible
    Playing,

    /// Paused mid-track, resumable
    Paused,

    /// Explicitly stopped
    Stopped,

    /// Playback failed; see the status error message
    Error,
}

/// Bitmask of transport operations valid in the current state.
///
/// Controllers use this to enable or disable their buttons; the session
/// recomputes it on every publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actions(u32);

impl Actions {
    pub const PLAY: Actions = Actions(1 << 0);
    pub const PAUSE: Actions = Actions(1 << 1);
    pub const PLAY_FROM_MEDIA_ID: Actions = Actions(1 << 2);
    pub const PLAY_FROM_SEARCH: Actions = Actions(1 << 3);
    pub const SKIP_TO_NEXT: Actions = Actions(1 << 4);
    pub const SKIP_TO_PREVIOUS: Actions = Actions(1 << 5);

    /// Empty set.
    pub fn none() -> Self {
        Actions(0)
    }

    /// Whether every action in `other` is present.
    pub fn contains(self, other: Actions) -> bool {
        self.0 & other.0 == other.0
    }

    /// Raw bits, for logging and wire use.
    pub fn bits(self) -> u32 {
        self.0
    }
}

impl std::ops::BitOr for Actions {
    type Output = Actions;

    fn bitor(self, rhs: Actions) -> Actions {
        Actions(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Actions {
    fn bitor_assign(&mut self, rhs: Actions) {
        self.0 |= rhs.0;
    }
}

/// Published session state: everything a remote controller needs to render
/// transport UI without asking questions back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    /// Engine state, or `Error` when `error` is set
    pub state: PlaybackState,

    /// Stream position at publish time, in milliseconds
    pub position_ms: u64,

    /// Playback rate (1.0 for normal speed)
    pub rate: f32,

    /// When this status was produced
    pub updated_at: DateTime<Utc>,

    /// Transport operations valid right now
    pub actions: Actions,

    /// Human-readable failure, present iff `state == Error`
    pub error: Option<String>,

    /// `queue_id` of the active item, when the cursor points at one
    pub active_queue_id: Option<u64>,

    /// Current repeat mode
    pub repeat: RepeatMode,
}

/// Published metadata snapshot for the active track.
///
/// The artwork arrives asynchronously; a snapshot without art is published
/// first and replaced once the fetch completes, provided the same track is
/// still active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub track: Track,

    /// Fetched album art, absent until the cache delivers it
    #[serde(skip)]
    pub art: Option<ArtworkImages>,
}
