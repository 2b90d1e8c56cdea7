//! Session Events
//!
//! Everything a controller or notification surface can observe is published
//! here. Events always describe state that has already been applied; no
//! event asks the receiver to do anything.

use serde::{Deserialize, Serialize};

use crate::types::{PlaybackStatus, RepeatMode, TrackMetadata};

/// Events broadcast by the media session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A new playback status was published (state, position, actions, error)
    PlaybackStatusChanged(PlaybackStatus),

    /// The active track's metadata snapshot changed.
    ///
    /// Published once when the track becomes active and again when its
    /// album art arrives, if the track is still the active one by then.
    MetadataChanged(TrackMetadata),

    /// The playing queue was replaced wholesale
    QueueChanged { title: String, size: usize },

    /// The repeat mode was changed via the custom action
    RepeatModeChanged(RepeatMode),

    /// The session shut itself down after the idle delay
    SessionStopped,
}
