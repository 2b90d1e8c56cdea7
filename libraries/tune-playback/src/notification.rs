//! Media notification presenter.
//!
//! Mirrors the published playback status and track metadata into a
//! [`MediaNotification`] model and hands it to a platform
//! [`NotificationSink`]. The manager is a plain state machine over session
//! events; the async part is just the loop feeding it.

use std::sync::Arc;
use tracing::debug;
use tune_artwork::AlbumArtCache;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::events::SessionEvent;
use crate::service::{MediaSessionHandle, TransportCommand};
use crate::types::{Actions, PlaybackState, PlaybackStatus, TrackMetadata};

/// Action identifiers carried by the notification's buttons
pub const ACTION_PAUSE: &str = "tune.action.pause";
pub const ACTION_PLAY: &str = "tune.action.play";
pub const ACTION_NEXT: &str = "tune.action.next";
pub const ACTION_PREV: &str = "tune.action.prev";

/// A button on the notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    Previous,
    Pause,
    Play,
    Next,
}

impl NotificationAction {
    /// The action identifier the platform wires to this button.
    pub fn id(self) -> &'static str {
        match self {
            Self::Previous => ACTION_PREV,
            Self::Pause => ACTION_PAUSE,
            Self::Play => ACTION_PLAY,
            Self::Next => ACTION_NEXT,
        }
    }
}

/// Transport command for a notification action id, if it names one.
pub fn transport_for_action(action: &str) -> Option<TransportCommand> {
    match action {
        ACTION_PAUSE => Some(TransportCommand::Pause),
        ACTION_PLAY => Some(TransportCommand::Play),
        ACTION_NEXT => Some(TransportCommand::SkipToNext),
        ACTION_PREV => Some(TransportCommand::SkipToPrevious),
        _ => None,
    }
}

/// Everything the platform needs to render the media notification
#[derive(Debug, Clone)]
pub struct MediaNotification {
    pub title: String,
    pub artist: String,
    pub album: String,

    /// Buttons in display order
    pub actions: Vec<NotificationAction>,

    /// Show a running chronometer; only sensible while playing
    pub show_elapsed: bool,

    /// Whether the notification is non-dismissable
    pub ongoing: bool,

    /// Small album art, when the cache has it
    pub icon: Option<Arc<Vec<u8>>>,

    /// Stream position when the notification was built, in milliseconds
    pub position_ms: u64,

    pub state: PlaybackState,
}

/// Platform seam: actually posting and cancelling the notification.
pub trait NotificationSink: Send + Sync {
    fn post(&self, notification: &MediaNotification);
    fn cancel(&self);
}

/// Keeps the platform notification in sync with the session.
pub struct MediaNotificationManager {
    sink: Arc<dyn NotificationSink>,
    art_cache: Arc<AlbumArtCache>,
    handle: MediaSessionHandle,
    started: bool,
    status: Option<PlaybackStatus>,
    metadata: Option<TrackMetadata>,
}

impl MediaNotificationManager {
    pub fn new(
        sink: Arc<dyn NotificationSink>,
        art_cache: Arc<AlbumArtCache>,
        handle: MediaSessionHandle,
    ) -> Self {
        Self {
            sink,
            art_cache,
            handle,
            started: false,
            status: None,
            metadata: None,
        }
    }

    /// Begin showing the notification.
    ///
    /// Needs both a status and metadata to build anything; returns whether
    /// the notification is now showing. Calling this while already started
    /// is a no-op.
    pub fn start(&mut self) -> bool {
        if self.started {
            return true;
        }
        match self.build_notification() {
            Some(notification) => {
                debug!("starting media notification");
                self.sink.post(&notification);
                self.started = true;
                true
            }
            None => false,
        }
    }

    /// Remove the notification. Safe to call when not showing.
    pub fn stop(&mut self) {
        if !self.started {
            return;
        }
        debug!("stopping media notification");
        self.started = false;
        self.sink.cancel();
    }

    /// Whether the notification is currently showing.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Apply one session event.
    pub fn handle_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::PlaybackStatusChanged(status) => {
                self.status = Some(status.clone());
                match status.state {
                    PlaybackState::Stopped | PlaybackState::None => self.stop(),
                    PlaybackState::Playing | PlaybackState::Paused => {
                        if self.started {
                            self.repost();
                        } else {
                            self.start();
                        }
                    }
                    _ => self.repost(),
                }
            }
            SessionEvent::MetadataChanged(metadata) => {
                self.metadata = Some(metadata.clone());
                self.repost();
            }
            SessionEvent::SessionStopped => self.stop(),
            SessionEvent::QueueChanged { .. } | SessionEvent::RepeatModeChanged(_) => {}
        }
    }

    /// Forward a notification button press to the session.
    pub async fn on_action(&self, action: &str) -> Result<()> {
        debug!(action, "notification action");
        if let Some(command) = transport_for_action(action) {
            self.handle.send(command).await?;
        }
        Ok(())
    }

    /// Drive the manager from a session event stream until it closes.
    pub async fn run(mut self, mut events: broadcast::Receiver<SessionEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => self.handle_event(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "notification lagged behind session events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        self.stop();
    }

    /// Build the notification model, if both inputs are present.
    pub fn build_notification(&self) -> Option<MediaNotification> {
        let status = self.status.as_ref()?;
        let metadata = self.metadata.as_ref()?;
        let playing = status.state == PlaybackState::Playing;

        let mut actions = Vec::new();
        if status.actions.contains(Actions::SKIP_TO_PREVIOUS) {
            actions.push(NotificationAction::Previous);
        }
        if playing {
            actions.push(NotificationAction::Pause);
        } else {
            actions.push(NotificationAction::Play);
        }
        if status.actions.contains(Actions::SKIP_TO_NEXT) {
            actions.push(NotificationAction::Next);
        }

        let icon = metadata.art.as_ref().map(|art| art.icon.clone()).or_else(|| {
            metadata
                .track
                .art_url
                .as_deref()
                .and_then(|url| self.art_cache.peek(url))
                .map(|art| art.icon)
        });

        Some(MediaNotification {
            title: metadata.track.title.clone(),
            artist: metadata.track.artist.clone(),
            album: metadata.track.album.clone(),
            actions,
            show_elapsed: playing,
            ongoing: playing,
            icon,
            position_ms: status.position_ms,
            state: status.state,
        })
    }

    fn repost(&self) {
        if !self.started {
            return;
        }
        if let Some(notification) = self.build_notification() {
            self.sink.post(&notification);
        }
    }
}
