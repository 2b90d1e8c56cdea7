//! In-memory music catalog with asynchronous initial load.
//!
//! The catalog indexes everything the rest of the system asks for: the flat
//! track list, tracks by album, albums by artist, playlists, and title
//! search. The actual media scan lives behind [`CatalogSource`]; the first
//! caller that needs the catalog triggers the load, and everyone arriving
//! while it runs waits for the same result instead of being dropped.

use crate::error::{CoreError, Result};
use crate::media_id::MEDIA_ID_NOW_PLAYING;
use crate::types::{AlbumSummary, Track, TrackId};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

/// Seam for whatever actually scans media (filesystem, media store, remote).
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Load every available track, in catalog order.
    async fn load_tracks(&self) -> Result<Vec<Track>>;

    /// Load playlists as (name, track ids). Sources without playlist
    /// support keep the default.
    async fn load_playlists(&self) -> Result<Vec<(String, Vec<TrackId>)>> {
        Ok(Vec::new())
    }
}

/// Catalog load lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogState {
    /// Nothing loaded yet
    NonInitialized,
    /// A load is in flight
    Initializing,
    /// Catalog is ready to serve
    Initialized,
}

#[derive(Default)]
struct CatalogIndex {
    tracks: Vec<Track>,
    by_id: HashMap<TrackId, Track>,
    by_album: BTreeMap<String, Vec<Track>>,
    artist_albums: BTreeMap<String, BTreeMap<String, AlbumSummary>>,
    by_playlist: BTreeMap<String, Vec<Track>>,
}

impl CatalogIndex {
    fn build(tracks: Vec<Track>, playlists: Vec<(String, Vec<TrackId>)>) -> Self {
        let mut index = Self::default();

        for track in &tracks {
            index.by_id.insert(track.id.clone(), track.clone());
            index
                .by_album
                .entry(track.album.clone())
                .or_default()
                .push(track.clone());

            let albums = index.artist_albums.entry(track.artist.clone()).or_default();
            let summary = albums
                .entry(track.album.clone())
                .or_insert_with(|| AlbumSummary {
                    album: track.album.clone(),
                    artist: track.artist.clone(),
                    track_count: 0,
                    art_url: None,
                });
            summary.track_count += 1;
            if summary.art_url.is_none() {
                summary.art_url.clone_from(&track.art_url);
            }
        }

        for (name, track_ids) in playlists {
            let resolved = track_ids
                .iter()
                .filter_map(|id| index.by_id.get(id).cloned())
                .collect();
            index.by_playlist.insert(name, resolved);
        }
        // The live queue shows up as a playlist so controllers can browse it.
        index
            .by_playlist
            .entry(MEDIA_ID_NOW_PLAYING.to_string())
            .or_default();

        index.tracks = tracks;
        index
    }
}

/// A provider of music contents: reads the catalog source once, indexes the
/// result and serves lookups from memory.
pub struct MusicCatalog {
    source: Arc<dyn CatalogSource>,
    index: RwLock<CatalogIndex>,
    state_tx: watch::Sender<CatalogState>,
}

impl MusicCatalog {
    /// Create a catalog over the given source. Nothing is loaded until the
    /// first [`MusicCatalog::ensure_ready`] call.
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        let (state_tx, _) = watch::channel(CatalogState::NonInitialized);
        Self {
            source,
            index: RwLock::new(CatalogIndex::default()),
            state_tx,
        }
    }

    /// Current load state.
    pub fn state(&self) -> CatalogState {
        *self.state_tx.borrow()
    }

    /// Whether the catalog has finished loading.
    pub fn is_initialized(&self) -> bool {
        self.state() == CatalogState::Initialized
    }

    /// Wait until the catalog is loaded, triggering the load if nobody has.
    ///
    /// Exactly one caller performs the load; concurrent callers wait for the
    /// same outcome. A failed load resets to `NonInitialized`, so the next
    /// call retries.
    pub async fn ensure_ready(&self) -> Result<()> {
        let mut state_rx = self.state_tx.subscribe();
        loop {
            let state = *state_rx.borrow_and_update();
            match state {
                CatalogState::Initialized => return Ok(()),
                CatalogState::NonInitialized => {
                    let won = self.state_tx.send_if_modified(|state| {
                        if *state == CatalogState::NonInitialized {
                            *state = CatalogState::Initializing;
                            true
                        } else {
                            false
                        }
                    });
                    if won {
                        return self.load().await;
                    }
                }
                CatalogState::Initializing => {}
            }
            if state_rx.changed().await.is_err() {
                return Err(CoreError::unavailable("catalog state channel closed"));
            }
        }
    }

    async fn load(&self) -> Result<()> {
        tracing::debug!("retrieving media from catalog source");
        match self.source.load_tracks().await {
            Ok(tracks) => {
                let playlists = match self.source.load_playlists().await {
                    Ok(playlists) => playlists,
                    Err(e) => {
                        tracing::warn!("playlist load failed, continuing without: {e}");
                        Vec::new()
                    }
                };
                let track_count = tracks.len();
                *self.index.write().unwrap() = CatalogIndex::build(tracks, playlists);
                let _ = self.state_tx.send(CatalogState::Initialized);
                tracing::debug!("music catalog ready, {track_count} tracks");
                Ok(())
            }
            Err(e) => {
                tracing::error!("failed to retrieve music catalog: {e}");
                let _ = self.state_tx.send(CatalogState::NonInitialized);
                Err(e)
            }
        }
    }

    /// The full track list, in catalog order. Empty until initialized.
    pub fn tracks(&self) -> Vec<Track> {
        if !self.is_initialized() {
            return Vec::new();
        }
        self.index.read().unwrap().tracks.clone()
    }

    /// All artist names.
    pub fn artists(&self) -> Vec<String> {
        if !self.is_initialized() {
            return Vec::new();
        }
        self.index
            .read()
            .unwrap()
            .artist_albums
            .keys()
            .cloned()
            .collect()
    }

    /// All albums across all artists.
    pub fn albums(&self) -> Vec<AlbumSummary> {
        if !self.is_initialized() {
            return Vec::new();
        }
        self.index
            .read()
            .unwrap()
            .artist_albums
            .values()
            .flat_map(|albums| albums.values().cloned())
            .collect()
    }

    /// Albums of one artist.
    pub fn albums_by_artist(&self, artist: &str) -> Vec<AlbumSummary> {
        if !self.is_initialized() {
            return Vec::new();
        }
        self.index
            .read()
            .unwrap()
            .artist_albums
            .get(artist)
            .map(|albums| albums.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Tracks of one album.
    pub fn tracks_by_album(&self, album: &str) -> Vec<Track> {
        if !self.is_initialized() {
            return Vec::new();
        }
        self.index
            .read()
            .unwrap()
            .by_album
            .get(album)
            .cloned()
            .unwrap_or_default()
    }

    /// Tracks of one artist, in album order.
    pub fn tracks_by_artist(&self, artist: &str) -> Vec<Track> {
        if !self.is_initialized() {
            return Vec::new();
        }
        let index = self.index.read().unwrap();
        let Some(albums) = index.artist_albums.get(artist) else {
            return Vec::new();
        };
        albums
            .keys()
            .filter_map(|album| index.by_album.get(album))
            .flatten()
            .filter(|track| track.artist == artist)
            .cloned()
            .collect()
    }

    /// All playlist names.
    pub fn playlists(&self) -> Vec<String> {
        if !self.is_initialized() {
            return Vec::new();
        }
        self.index
            .read()
            .unwrap()
            .by_playlist
            .keys()
            .cloned()
            .collect()
    }

    /// Tracks of one playlist.
    pub fn tracks_by_playlist(&self, playlist: &str) -> Vec<Track> {
        if !self.is_initialized() {
            return Vec::new();
        }
        self.index
            .read()
            .unwrap()
            .by_playlist
            .get(playlist)
            .cloned()
            .unwrap_or_default()
    }

    /// Look up a track by its unique id.
    pub fn track_by_id(&self, track_id: &str) -> Option<Track> {
        self.index.read().unwrap().by_id.get(track_id).cloned()
    }

    /// Very basic search: tracks whose title contains the query,
    /// case-insensitive.
    pub fn search(&self, title_query: &str) -> Vec<Track> {
        if !self.is_initialized() {
            return Vec::new();
        }
        let query = title_query.to_lowercase();
        self.index
            .read()
            .unwrap()
            .tracks
            .iter()
            .filter(|track| track.title.to_lowercase().contains(&query))
            .cloned()
            .collect()
    }
}
