//! Playback-queue and session-state coordination.
//!
//! The heart of the player: the playing queue, the session state machine,
//! the actor service that serializes commands and engine callbacks, the
//! notification presenter, and the hierarchical browse surface. Audio
//! itself lives behind the [`PlaybackEngine`] trait; platform notification
//! plumbing behind [`NotificationSink`].

#![forbid(unsafe_code)]

pub mod browse;
pub mod engine;
pub mod error;
pub mod events;
pub mod notification;
pub mod queue;
pub mod session;
pub mod service;
pub mod types;

pub use browse::{BrowseItem, MediaBrowser};
pub use engine::PlaybackEngine;
pub use error::{Result, SessionError};
pub use events::SessionEvent;
pub use notification::{
    MediaNotification, MediaNotificationManager, NotificationAction, NotificationSink,
};
pub use queue::QueueBuildError;
pub use session::PlaybackSession;
pub use service::{MediaSessionHandle, MediaSessionService, TransportCommand, STOP_DELAY};
pub use types::{
    Actions, PlaybackState, PlaybackStatus, QueueItem, RepeatMode, TrackMetadata,
};
