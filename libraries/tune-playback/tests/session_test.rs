//! Session coordinator integration tests: queue lifecycle, skip semantics,
//! repeat modes, and the artwork staleness guard, driven through a fake
//! engine and an in-memory catalog.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tune_artwork::{AlbumArtCache, ArtFetcher, ArtworkImages, FetchedArt};
use tune_core::media_id::{self, MEDIA_ID_BY_ALBUM, MEDIA_ID_BY_ARTIST};
use tune_core::{CatalogSource, MusicCatalog, Track};
use tune_playback::{
    Actions, PlaybackEngine, PlaybackSession, PlaybackState, QueueItem, RepeatMode, SessionEvent,
};

struct FixedSource(Vec<Track>);

#[async_trait::async_trait]
impl CatalogSource for FixedSource {
    async fn load_tracks(&self) -> tune_core::Result<Vec<Track>> {
        Ok(self.0.clone())
    }
}

struct SilentFetcher;

#[async_trait::async_trait]
impl ArtFetcher for SilentFetcher {
    async fn fetch(&self, url: &str) -> tune_artwork::Result<FetchedArt> {
        Ok(FetchedArt {
            big: url.as_bytes().to_vec(),
            icon: vec![1],
        })
    }
}

#[derive(Default)]
struct FakeEngineState {
    playing: bool,
    stopped: bool,
    played: Vec<String>,
    pauses: usize,
    stops: usize,
    seeks: Vec<u64>,
}

#[derive(Clone)]
struct FakeEngine(Arc<Mutex<FakeEngineState>>);

impl FakeEngine {
    fn new() -> (Self, Arc<Mutex<FakeEngineState>>) {
        let state = Arc::new(Mutex::new(FakeEngineState::default()));
        (Self(state.clone()), state)
    }
}

impl PlaybackEngine for FakeEngine {
    fn play(&mut self, item: &QueueItem) {
        let mut state = self.0.lock().unwrap();
        state.playing = true;
        state.stopped = false;
        state.played.push(item.track.id.clone());
    }

    fn pause(&mut self) {
        let mut state = self.0.lock().unwrap();
        state.playing = false;
        state.pauses += 1;
    }

    fn stop(&mut self, _notify: bool) {
        let mut state = self.0.lock().unwrap();
        state.playing = false;
        state.stopped = true;
        state.stops += 1;
    }

    fn seek_to(&mut self, position_ms: u64) {
        self.0.lock().unwrap().seeks.push(position_ms);
    }

    fn is_playing(&self) -> bool {
        self.0.lock().unwrap().playing
    }

    fn position_ms(&self) -> u64 {
        0
    }

    fn state(&self) -> PlaybackState {
        let state = self.0.lock().unwrap();
        if state.playing {
            PlaybackState::Playing
        } else if state.stopped {
            PlaybackState::Stopped
        } else {
            PlaybackState::None
        }
    }
}

fn track(id: &str, title: &str, artist: &str, album: &str, art: Option<&str>) -> Track {
    Track {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        album: album.to_string(),
        duration: Duration::from_secs(180),
        art_url: art.map(str::to_string),
        source: format!("/music/{id}.mp3"),
    }
}

fn sample_tracks() -> Vec<Track> {
    vec![
        track("1", "Alpha", "Ann", "First", Some("art://first")),
        track("2", "Beta", "Ann", "First", None),
        track("3", "Gamma", "Ann", "First", None),
        track("4", "Delta", "Bob", "Second", None),
    ]
}

async fn session_with(tracks: Vec<Track>) -> (PlaybackSession, Arc<Mutex<FakeEngineState>>) {
    let catalog = Arc::new(MusicCatalog::new(Arc::new(FixedSource(tracks))));
    catalog.ensure_ready().await.unwrap();
    let art_cache = Arc::new(AlbumArtCache::new(Arc::new(SilentFetcher)));
    let (engine, state) = FakeEngine::new();
    let session = PlaybackSession::new(catalog, art_cache, Box::new(engine));
    (session, state)
}

fn album_leaf(track_id: &str, album: &str) -> String {
    media_id::create_media_id(Some(track_id), &[MEDIA_ID_BY_ALBUM, album])
}

fn played(state: &Arc<Mutex<FakeEngineState>>) -> Vec<String> {
    state.lock().unwrap().played.clone()
}

fn last_status(events: &[SessionEvent]) -> Option<&tune_playback::PlaybackStatus> {
    events.iter().rev().find_map(|event| match event {
        SessionEvent::PlaybackStatusChanged(status) => Some(status),
        _ => None,
    })
}

#[tokio::test]
async fn bare_play_falls_back_to_default_queue() {
    let (mut session, engine) = session_with(sample_tracks()).await;

    session.play().unwrap();

    // First artist in catalog order is Ann; playback starts at her first track.
    assert_eq!(session.queue_title(), "Random music");
    assert_eq!(session.queue().len(), 3);
    assert_eq!(session.cursor(), 0);
    assert_eq!(played(&engine), vec!["1"]);

    let events = session.take_events();
    assert!(matches!(
        events[0],
        SessionEvent::QueueChanged { size: 3, .. }
    ));
    assert!(events
        .iter()
        .any(|event| matches!(event, SessionEvent::MetadataChanged(_))));
}

#[tokio::test]
async fn bare_play_with_empty_catalog_does_nothing() {
    let (mut session, engine) = session_with(Vec::new()).await;
    session.play().unwrap();
    assert!(played(&engine).is_empty());
    assert_eq!(engine.lock().unwrap().stops, 0);
}

#[tokio::test]
async fn play_from_media_id_starts_at_the_selected_item() {
    let (mut session, engine) = session_with(sample_tracks()).await;

    session.play_from_media_id(&album_leaf("2", "First")).unwrap();

    assert_eq!(session.cursor(), 1);
    assert_eq!(played(&engine), vec!["2"]);
    assert_eq!(session.queue_title(), "Music from First");
    assert_eq!(session.metadata().unwrap().track.id, "2");
}

#[tokio::test]
async fn play_from_media_id_by_artist_aborts_without_touching_the_queue() {
    let (mut session, engine) = session_with(sample_tracks()).await;
    session.play_from_media_id(&album_leaf("2", "First")).unwrap();
    session.take_events();

    let by_artist = media_id::create_media_id(Some("1"), &[MEDIA_ID_BY_ARTIST, "Ann"]);
    session.play_from_media_id(&by_artist).unwrap();

    // Build failure leaves the album queue playing as before.
    assert_eq!(session.queue().len(), 3);
    assert_eq!(played(&engine), vec!["2"]);
    assert!(session.take_events().is_empty());
}

#[tokio::test]
async fn unknown_media_id_on_queue_is_ignored() {
    let (mut session, engine) = session_with(sample_tracks()).await;
    session.play_from_media_id(&album_leaf("99", "First")).unwrap();

    // The queue was rebuilt, but nothing matches the requested leaf.
    assert_eq!(session.queue().len(), 3);
    assert!(played(&engine).is_empty());
}

#[tokio::test]
async fn skip_next_wraps_to_the_first_item() {
    let (mut session, engine) = session_with(sample_tracks()).await;
    session.play_from_media_id(&album_leaf("3", "First")).unwrap();
    assert_eq!(session.cursor(), 2);

    session.skip_next().unwrap();

    assert_eq!(session.cursor(), 0);
    assert_eq!(played(&engine), vec!["3", "1"]);
}

#[tokio::test]
async fn skip_previous_on_first_item_restarts_it() {
    let (mut session, engine) = session_with(sample_tracks()).await;
    session.play_from_media_id(&album_leaf("1", "First")).unwrap();

    session.skip_previous().unwrap();

    assert_eq!(session.cursor(), 0);
    assert_eq!(played(&engine), vec!["1", "1"]);
}

#[tokio::test]
async fn skip_on_empty_queue_stops_with_message() {
    let (mut session, engine) = session_with(sample_tracks()).await;

    session.skip_next().unwrap();

    assert_eq!(engine.lock().unwrap().stops, 1);
    let events = session.take_events();
    let status = last_status(&events).unwrap();
    assert_eq!(status.state, PlaybackState::Error);
    assert_eq!(status.error.as_deref(), Some("Cannot skip"));
}

#[tokio::test]
async fn skip_to_unknown_queue_id_is_a_silent_no_op() {
    let (mut session, engine) = session_with(sample_tracks()).await;
    session.play_from_media_id(&album_leaf("2", "First")).unwrap();
    session.take_events();

    session.skip_to_queue_item(42).unwrap();

    assert_eq!(session.cursor(), 1);
    assert_eq!(played(&engine), vec!["2"]);
    assert!(session.take_events().is_empty());
}

#[tokio::test]
async fn skip_to_queue_item_jumps_by_queue_id() {
    let (mut session, engine) = session_with(sample_tracks()).await;
    session.play_from_media_id(&album_leaf("1", "First")).unwrap();

    session.skip_to_queue_item(2).unwrap();

    assert_eq!(session.cursor(), 2);
    assert_eq!(played(&engine), vec!["1", "3"]);
}

#[tokio::test]
async fn completion_with_repeat_none_stops_past_the_end() {
    let (mut session, engine) = session_with(sample_tracks()).await;
    session.play_from_media_id(&album_leaf("3", "First")).unwrap();

    session.on_completion().unwrap();

    assert_eq!(engine.lock().unwrap().stops, 1);
    assert_eq!(played(&engine), vec!["3"]);
    let events = session.take_events();
    let status = last_status(&events).unwrap();
    assert_eq!(status.state, PlaybackState::Stopped);
    assert!(status.error.is_none());
}

#[tokio::test]
async fn completion_with_repeat_all_wraps() {
    let (mut session, engine) = session_with(sample_tracks()).await;
    session.play_from_media_id(&album_leaf("3", "First")).unwrap();
    session.set_repeat_mode(RepeatMode::All);

    session.on_completion().unwrap();

    assert_eq!(session.cursor(), 0);
    assert_eq!(played(&engine), vec!["3", "1"]);
}

#[tokio::test]
async fn completion_with_repeat_current_replays_the_same_item() {
    let (mut session, engine) = session_with(sample_tracks()).await;
    session.play_from_media_id(&album_leaf("2", "First")).unwrap();
    session.set_repeat_mode(RepeatMode::Current);

    session.on_completion().unwrap();
    session.on_completion().unwrap();

    assert_eq!(session.cursor(), 1);
    assert_eq!(played(&engine), vec!["2", "2", "2"]);
}

#[tokio::test]
async fn mid_queue_completion_advances_normally() {
    let (mut session, engine) = session_with(sample_tracks()).await;
    session.play_from_media_id(&album_leaf("1", "First")).unwrap();

    session.on_completion().unwrap();

    assert_eq!(session.cursor(), 1);
    assert_eq!(played(&engine), vec!["1", "2"]);
}

#[tokio::test]
async fn empty_search_plays_the_default_queue() {
    let (mut session, engine) = session_with(sample_tracks()).await;

    session.play_from_search("").unwrap();

    assert_eq!(session.queue().len(), 3);
    assert_eq!(played(&engine), vec!["1"]);
}

#[tokio::test]
async fn search_without_results_stops_with_message_and_never_plays() {
    let (mut session, engine) = session_with(sample_tracks()).await;

    session.play_from_search("zebra").unwrap();

    assert!(played(&engine).is_empty());
    assert_eq!(engine.lock().unwrap().stops, 1);
    let events = session.take_events();
    let status = last_status(&events).unwrap();
    assert_eq!(status.state, PlaybackState::Error);
    assert_eq!(status.error.as_deref(), Some("No search results"));
}

#[tokio::test]
async fn search_with_results_plays_the_first_hit() {
    let (mut session, engine) = session_with(sample_tracks()).await;

    session.play_from_search("Delta").unwrap();

    assert_eq!(session.queue().len(), 1);
    assert_eq!(played(&engine), vec!["4"]);
}

#[tokio::test]
async fn available_actions_follow_the_cursor() {
    let (mut session, _engine) = session_with(sample_tracks()).await;
    let base = Actions::PLAY | Actions::PLAY_FROM_MEDIA_ID | Actions::PLAY_FROM_SEARCH;

    // Empty queue offers only the entry points.
    assert_eq!(session.available_actions(), base);

    session.play_from_media_id(&album_leaf("1", "First")).unwrap();
    let actions = session.available_actions();
    assert!(actions.contains(Actions::PAUSE));
    assert!(actions.contains(Actions::SKIP_TO_NEXT));
    assert!(!actions.contains(Actions::SKIP_TO_PREVIOUS));

    session.skip_to_queue_item(1).unwrap();
    let actions = session.available_actions();
    assert!(actions.contains(Actions::SKIP_TO_NEXT));
    assert!(actions.contains(Actions::SKIP_TO_PREVIOUS));

    session.skip_to_queue_item(2).unwrap();
    let actions = session.available_actions();
    assert!(!actions.contains(Actions::SKIP_TO_NEXT));
    assert!(actions.contains(Actions::SKIP_TO_PREVIOUS));
}

#[tokio::test]
async fn pause_requests_the_idle_stop_timer() {
    let (mut session, engine) = session_with(sample_tracks()).await;
    session.play().unwrap();
    assert!(!session.take_delayed_stop_request());

    session.handle_pause_request();

    assert_eq!(engine.lock().unwrap().pauses, 1);
    assert!(session.take_delayed_stop_request());
}

#[tokio::test]
async fn stop_marks_the_service_stoppable() {
    let (mut session, _engine) = session_with(sample_tracks()).await;
    session.play().unwrap();
    session.take_service_stop_request();

    session.handle_stop_request(None);

    assert!(session.take_delayed_stop_request());
    assert!(session.take_service_stop_request());
}

#[tokio::test]
async fn missing_art_is_requested_once_and_applied_when_current() {
    let (mut session, _engine) = session_with(sample_tracks()).await;
    session.play_from_media_id(&album_leaf("1", "First")).unwrap();

    let request = session.take_art_request().unwrap();
    assert_eq!(request.url, "art://first");
    session.take_events();

    let images = ArtworkImages {
        big: Arc::new(vec![7]),
        icon: Arc::new(vec![8]),
    };
    session.on_art_fetched(&request.media_id, &request.url, images);

    assert!(session.metadata().unwrap().art.is_some());
    assert!(session
        .take_events()
        .iter()
        .any(|event| matches!(event, SessionEvent::MetadataChanged(_))));
}

#[tokio::test]
async fn stale_art_completion_does_not_touch_current_metadata() {
    let (mut session, _engine) = session_with(sample_tracks()).await;
    session.play_from_media_id(&album_leaf("1", "First")).unwrap();
    let request = session.take_art_request().unwrap();

    // Move on before the fetch lands.
    session.skip_next().unwrap();
    session.take_events();

    let images = ArtworkImages {
        big: Arc::new(vec![7]),
        icon: Arc::new(vec![8]),
    };
    session.on_art_fetched(&request.media_id, &request.url, images);

    assert_eq!(session.metadata().unwrap().track.id, "2");
    assert!(session.metadata().unwrap().art.is_none());
    assert!(session.take_events().is_empty());
}

#[tokio::test]
async fn seek_is_forwarded_to_the_engine() {
    let (mut session, engine) = session_with(sample_tracks()).await;
    session.play().unwrap();

    session.handle_seek_to(42_000);

    assert_eq!(engine.lock().unwrap().seeks, vec![42_000]);
}

#[tokio::test]
async fn engine_error_publishes_an_error_status() {
    let (mut session, _engine) = session_with(sample_tracks()).await;
    session.play().unwrap();
    session.take_events();

    session.on_error("decoder died");

    let events = session.take_events();
    let status = last_status(&events).unwrap();
    assert_eq!(status.state, PlaybackState::Error);
    assert_eq!(status.error.as_deref(), Some("decoder died"));
}

#[tokio::test]
async fn repeat_mode_change_republishes_the_status() {
    let (mut session, _engine) = session_with(sample_tracks()).await;
    session.play_from_media_id(&album_leaf("2", "First")).unwrap();
    session.take_events();

    session.set_repeat_mode(RepeatMode::All);

    let events = session.take_events();
    assert!(events
        .iter()
        .any(|event| matches!(event, SessionEvent::RepeatModeChanged(RepeatMode::All))));
    let status = last_status(&events).unwrap();
    assert_eq!(status.repeat, RepeatMode::All);
}

#[tokio::test]
async fn status_publishes_the_active_queue_id() {
    let (mut session, _engine) = session_with(sample_tracks()).await;
    session.play_from_media_id(&album_leaf("2", "First")).unwrap();
    session.take_events();

    session.on_status_changed();

    let events = session.take_events();
    let status = last_status(&events).unwrap();
    assert_eq!(status.state, PlaybackState::Playing);
    assert_eq!(status.active_queue_id, Some(1));
    assert_eq!(status.repeat, RepeatMode::None);
}
