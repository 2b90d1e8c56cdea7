//! Session coordinator - core orchestration
//!
//! Owns the playing queue, the cursor, repeat mode, and the published
//! status/metadata, and drives the playback engine. This is a plain
//! single-writer state machine: every mutation comes in through `&mut self`,
//! and everything observable leaves through the pending-event buffer that
//! the surrounding service drains after each command.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error};
use tune_artwork::{AlbumArtCache, ArtworkImages};
use tune_core::{media_id, MusicCatalog};

use crate::engine::PlaybackEngine;
use crate::error::{Result, SessionError};
use crate::events::SessionEvent;
use crate::queue;
use crate::types::{Actions, PlaybackState, PlaybackStatus, QueueItem, RepeatMode, TrackMetadata};

/// Queue title used for the fallback queue built by a bare play command
const RANDOM_QUEUE_TITLE: &str = "Random music";

/// An album-art fetch the session wants performed.
///
/// The session itself is synchronous; the service picks this up, runs the
/// fetch, and feeds the result back through `on_art_fetched`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtRequest {
    /// Media id of the queue item the art belongs to, for the stale guard
    pub media_id: String,
    /// Artwork URL to fetch
    pub url: String,
}

/// The playback-session state machine.
pub struct PlaybackSession {
    catalog: Arc<MusicCatalog>,
    art_cache: Arc<AlbumArtCache>,
    engine: Box<dyn PlaybackEngine>,

    queue: Vec<QueueItem>,
    queue_title: String,
    /// Index of the active item; -1 or past the end means none.
    cursor: i64,
    repeat: RepeatMode,
    metadata: Option<TrackMetadata>,

    pending_events: Vec<SessionEvent>,
    art_request: Option<ArtRequest>,
    delayed_stop_requested: bool,
    service_stop_requested: bool,
}

impl PlaybackSession {
    pub fn new(
        catalog: Arc<MusicCatalog>,
        art_cache: Arc<AlbumArtCache>,
        engine: Box<dyn PlaybackEngine>,
    ) -> Self {
        Self {
            catalog,
            art_cache,
            engine,
            queue: Vec::new(),
            queue_title: String::new(),
            cursor: -1,
            repeat: RepeatMode::default(),
            metadata: None,
            pending_events: Vec::new(),
            art_request: None,
            delayed_stop_requested: false,
            service_stop_requested: false,
        }
    }

    // ---- transport commands ----

    /// Bare play: with nothing queued, fall back to the default queue and
    /// start from its beginning.
    pub fn play(&mut self) -> Result<()> {
        debug!("play");
        if self.queue.is_empty() {
            self.queue = queue::default_queue(&self.catalog);
            self.queue_title = RANDOM_QUEUE_TITLE.to_string();
            self.cursor = 0;
            self.emit_queue_changed();
        }
        if self.queue.is_empty() {
            return Ok(());
        }
        self.handle_play_request()
    }

    /// Build a fresh queue from a hierarchy-aware media id and play the
    /// selected item. A queue that cannot be built aborts the command
    /// without touching the current queue.
    pub fn play_from_media_id(&mut self, media_id: &str) -> Result<()> {
        debug!(media_id, "play from media id");
        match queue::build_queue(media_id, &self.catalog) {
            Ok(new_queue) => self.queue = new_queue,
            Err(e) => {
                error!("cannot build queue for {media_id}: {e}");
                return Ok(());
            }
        }
        self.queue_title = media_id::browse_category_value(media_id)
            .map(|value| format!("Music from {value}"))
            .unwrap_or_else(|| "Music".to_string());
        self.emit_queue_changed();

        if self.queue.is_empty() {
            return Ok(());
        }
        match queue::index_of_media_id(&self.queue, media_id) {
            Some(index) => {
                self.cursor = index as i64;
                self.handle_play_request()
            }
            None => {
                error!(media_id, "media id could not be found on queue, ignoring");
                Ok(())
            }
        }
    }

    /// Jump to a specific entry of the current queue. An id that resolves to
    /// nothing is ignored; the queue and cursor stay as they are.
    pub fn skip_to_queue_item(&mut self, queue_id: u64) -> Result<()> {
        debug!(queue_id, "skip to queue item");
        if self.queue.is_empty() {
            return Ok(());
        }
        match queue::index_of_queue_id(&self.queue, queue_id) {
            Some(index) => {
                self.cursor = index as i64;
                self.handle_play_request()
            }
            None => {
                debug!(queue_id, "queue id not found on queue, ignoring");
                Ok(())
            }
        }
    }

    /// Advance the cursor; past the last item it wraps to the first.
    pub fn skip_next(&mut self) -> Result<()> {
        debug!("skip to next");
        self.cursor += 1;
        if self.cursor >= self.queue.len() as i64 {
            self.cursor = 0;
        }
        if queue::is_index_playable(self.cursor, &self.queue) {
            self.handle_play_request()
        } else {
            error!(
                cursor = self.cursor,
                queue_len = self.queue.len(),
                "cannot skip to next"
            );
            self.handle_stop_request(Some("Cannot skip".to_string()));
            Ok(())
        }
    }

    /// Move the cursor back; on the first item it stays there, restarting
    /// the track rather than wrapping to the end.
    pub fn skip_previous(&mut self) -> Result<()> {
        debug!("skip to previous");
        self.cursor -= 1;
        if self.cursor < 0 {
            self.cursor = 0;
        }
        if queue::is_index_playable(self.cursor, &self.queue) {
            self.handle_play_request()
        } else {
            error!(
                cursor = self.cursor,
                queue_len = self.queue.len(),
                "cannot skip to previous"
            );
            self.handle_stop_request(Some("Cannot skip".to_string()));
            Ok(())
        }
    }

    /// Play from a voice/text search. An empty query means "play something",
    /// which maps to the default queue; a search with no hits stops with a
    /// message instead of playing nothing silently.
    pub fn play_from_search(&mut self, query: &str) -> Result<()> {
        debug!(query, "play from search");
        self.queue = if query.is_empty() {
            queue::default_queue(&self.catalog)
        } else {
            queue::search_queue(query, &self.catalog)
        };
        self.emit_queue_changed();
        if self.queue.is_empty() {
            self.handle_stop_request(Some("No search results".to_string()));
            Ok(())
        } else {
            self.cursor = 0;
            self.handle_play_request()
        }
    }

    pub fn handle_pause_request(&mut self) {
        debug!(state = ?self.engine.state(), "handle pause request");
        self.engine.pause();
        self.delayed_stop_requested = true;
    }

    pub fn handle_stop_request(&mut self, error: Option<String>) {
        debug!(state = ?self.engine.state(), ?error, "handle stop request");
        self.engine.stop(true);
        self.delayed_stop_requested = true;
        self.publish_status(error);
        self.service_stop_requested = true;
    }

    pub fn handle_seek_to(&mut self, position_ms: u64) {
        debug!(position_ms, "seek");
        self.engine.seek_to(position_ms);
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat = mode;
        debug!(?mode, "modified repeat mode");
        self.emit(SessionEvent::RepeatModeChanged(mode));
        // Controllers reading only the status snapshot see the new mode too.
        self.publish_status(None);
    }

    // ---- engine callbacks ----

    /// The current track finished on its own; apply the repeat mode.
    pub fn on_completion(&mut self) -> Result<()> {
        debug!(repeat = ?self.repeat, "track completed");
        if self.queue.is_empty() {
            self.handle_stop_request(None);
            return Ok(());
        }
        match self.repeat {
            RepeatMode::Current => {}
            RepeatMode::All => {
                self.cursor += 1;
                if self.cursor >= self.queue.len() as i64 {
                    self.cursor = 0;
                }
            }
            RepeatMode::None => {
                self.cursor += 1;
                if self.cursor >= self.queue.len() as i64 {
                    self.handle_stop_request(None);
                    return Ok(());
                }
            }
        }
        self.handle_play_request()
    }

    /// The engine moved between states; republish.
    pub fn on_status_changed(&mut self) {
        self.publish_status(None);
    }

    /// The engine failed; publish an error status with its message.
    pub fn on_error(&mut self, message: &str) {
        error!("playback engine error: {message}");
        self.publish_status(Some(message.to_string()));
    }

    /// Album art arrived for a prior request. Applied only if the same
    /// track is still active and still points at the same URL; late or
    /// reordered completions for older tracks are dropped.
    pub fn on_art_fetched(&mut self, media_id: &str, url: &str, images: ArtworkImages) {
        if !queue::is_index_playable(self.cursor, &self.queue) {
            return;
        }
        let current = &self.queue[self.cursor as usize];
        let still_current = media_id::extract_track_id(media_id).is_some()
            && media_id::extract_track_id(media_id) == media_id::extract_track_id(&current.media_id)
            && current.track.art_url.as_deref() == Some(url);
        if !still_current {
            debug!(url, "discarding stale album art");
            return;
        }
        if let Some(metadata) = &mut self.metadata {
            metadata.art = Some(images);
        }
        if let Some(snapshot) = self.metadata.clone() {
            self.emit(SessionEvent::MetadataChanged(snapshot));
        }
    }

    // ---- internals ----

    fn handle_play_request(&mut self) -> Result<()> {
        debug!(state = ?self.engine.state(), "handle play request");
        if queue::is_index_playable(self.cursor, &self.queue) {
            self.update_metadata()?;
            let item = self.queue[self.cursor as usize].clone();
            self.engine.play(&item);
        }
        Ok(())
    }

    /// Publish the metadata snapshot for the item under the cursor.
    ///
    /// The track resolved from the catalog must carry the same id the queue
    /// item's media id embeds; a mismatch means the queue and the catalog
    /// have diverged and the session cannot keep publishing consistent
    /// state, so it fails the command instead.
    fn update_metadata(&mut self) -> Result<()> {
        if !queue::is_index_playable(self.cursor, &self.queue) {
            error!("cannot retrieve current metadata");
            self.publish_status(Some("Unable to retrieve metadata".to_string()));
            return Ok(());
        }
        let item = self.queue[self.cursor as usize].clone();
        let Some(track_id) = media_id::extract_track_id(&item.media_id) else {
            error!(media_id = %item.media_id, "queue item media id has no track id");
            return Err(SessionError::CatalogMismatch {
                media_id: item.media_id.clone(),
                resolved: None,
            });
        };

        let resolved = self.catalog.track_by_id(track_id);
        let track = match resolved {
            Some(track) if track.id == track_id => track,
            other => {
                let resolved_id = other.map(|t| t.id);
                error!(
                    track_id,
                    ?resolved_id,
                    media_id = %item.media_id,
                    "track id should match the id embedded in the queue item"
                );
                return Err(SessionError::CatalogMismatch {
                    media_id: item.media_id.clone(),
                    resolved: resolved_id,
                });
            }
        };

        debug!(track_id, "updating metadata");
        let mut metadata = TrackMetadata {
            track: track.clone(),
            art: None,
        };
        if let Some(url) = track.art_url.as_deref() {
            if let Some(images) = self.art_cache.peek(url) {
                metadata.art = Some(images);
            } else {
                self.art_request = Some(ArtRequest {
                    media_id: item.media_id.clone(),
                    url: url.to_string(),
                });
            }
        }
        self.metadata = Some(metadata.clone());
        self.emit(SessionEvent::MetadataChanged(metadata));
        Ok(())
    }

    fn publish_status(&mut self, error: Option<String>) {
        let state = if error.is_some() {
            PlaybackState::Error
        } else {
            self.engine.state()
        };
        let active_queue_id = if queue::is_index_playable(self.cursor, &self.queue) {
            Some(self.queue[self.cursor as usize].queue_id)
        } else {
            None
        };
        let status = PlaybackStatus {
            state,
            position_ms: self.engine.position_ms(),
            rate: 1.0,
            updated_at: Utc::now(),
            actions: self.available_actions(),
            error,
            active_queue_id,
            repeat: self.repeat,
        };
        self.emit(SessionEvent::PlaybackStatusChanged(status));
    }

    /// Transport operations valid right now. The three play entry points
    /// are always allowed; everything else depends on the queue and cursor.
    pub fn available_actions(&self) -> Actions {
        let mut actions = Actions::PLAY | Actions::PLAY_FROM_MEDIA_ID | Actions::PLAY_FROM_SEARCH;
        if self.queue.is_empty() {
            return actions;
        }
        if self.engine.is_playing() {
            actions |= Actions::PAUSE;
        }
        if self.cursor > 0 {
            actions |= Actions::SKIP_TO_PREVIOUS;
        }
        if self.cursor < self.queue.len() as i64 - 1 {
            actions |= Actions::SKIP_TO_NEXT;
        }
        actions
    }

    fn emit(&mut self, event: SessionEvent) {
        self.pending_events.push(event);
    }

    fn emit_queue_changed(&mut self) {
        let event = SessionEvent::QueueChanged {
            title: self.queue_title.clone(),
            size: self.queue.len(),
        };
        self.emit(event);
    }

    // ---- accessors for the service and tests ----

    pub fn catalog(&self) -> &Arc<MusicCatalog> {
        &self.catalog
    }

    pub fn art_cache(&self) -> &Arc<AlbumArtCache> {
        &self.art_cache
    }

    pub fn queue(&self) -> &[QueueItem] {
        &self.queue
    }

    pub fn queue_title(&self) -> &str {
        &self.queue_title
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    pub fn metadata(&self) -> Option<&TrackMetadata> {
        self.metadata.as_ref()
    }

    pub fn is_engine_playing(&self) -> bool {
        self.engine.is_playing()
    }

    /// Drain events accumulated since the last drain.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Pending art fetch, if the last command wanted one.
    pub fn take_art_request(&mut self) -> Option<ArtRequest> {
        self.art_request.take()
    }

    /// Whether the last command asked for the idle-stop timer to be armed.
    pub fn take_delayed_stop_request(&mut self) -> bool {
        std::mem::take(&mut self.delayed_stop_requested)
    }

    /// Whether the last command stopped the session outright.
    pub fn take_service_stop_request(&mut self) -> bool {
        std::mem::take(&mut self.service_stop_requested)
    }
}
