//! Hierarchical browse surface.
//!
//! Controllers explore the catalog as a tree: root, four top categories,
//! then leaves. Leaf media ids are hierarchy-aware so that playing a leaf
//! rebuilds the exact queue it was browsed from. The special now-playing
//! playlist reflects the live queue, not the catalog.

use std::sync::{Arc, RwLock};
use tracing::{debug, warn};
use tune_core::media_id::{
    self, MEDIA_ID_BY_ALBUM, MEDIA_ID_BY_ARTIST, MEDIA_ID_BY_PLAYLIST, MEDIA_ID_BY_SONG,
    MEDIA_ID_NOW_PLAYING, MEDIA_ID_ROOT,
};
use tune_core::{MusicCatalog, Result, Track};

use crate::types::QueueItem;

/// One entry in a browse listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseItem {
    pub media_id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub browsable: bool,
    pub playable: bool,
}

impl BrowseItem {
    fn browsable(media_id: String, title: String, subtitle: Option<String>) -> Self {
        Self {
            media_id,
            title,
            subtitle,
            browsable: true,
            playable: false,
        }
    }

    fn playable(media_id: String, track: &Track) -> Self {
        Self {
            media_id,
            title: track.title.clone(),
            subtitle: Some(track.artist.clone()),
            browsable: false,
            playable: true,
        }
    }
}

/// Read-only browse view over the catalog and the live queue.
pub struct MediaBrowser {
    catalog: Arc<MusicCatalog>,
    now_playing: Arc<RwLock<Vec<QueueItem>>>,
}

impl MediaBrowser {
    pub fn new(catalog: Arc<MusicCatalog>, now_playing: Arc<RwLock<Vec<QueueItem>>>) -> Self {
        Self {
            catalog,
            now_playing,
        }
    }

    /// The id every browse session starts from.
    pub fn root_id(&self) -> &'static str {
        MEDIA_ID_ROOT
    }

    /// List the children of a browse node.
    ///
    /// Waits for the catalog to finish loading first, so a request that
    /// arrives before the initial scan is answered late rather than empty.
    /// An unrecognized parent id yields an empty listing.
    pub async fn children(&self, parent_id: &str) -> Result<Vec<BrowseItem>> {
        debug!(parent_id, "loading browse children");
        self.catalog.ensure_ready().await?;

        let hierarchy = media_id::hierarchy(parent_id);
        let items = match hierarchy.as_slice() {
            [MEDIA_ID_ROOT] => self.root_items(),
            [MEDIA_ID_BY_ARTIST] => self.artist_items(),
            [MEDIA_ID_BY_ARTIST, artist] => self.album_items(self.catalog.albums_by_artist(artist)),
            [MEDIA_ID_BY_ALBUM] => self.album_items(self.catalog.albums()),
            [MEDIA_ID_BY_ALBUM, album] => {
                song_items(self.catalog.tracks_by_album(album), parent_id)
            }
            [MEDIA_ID_BY_SONG] => {
                // All songs live under a synthetic two-level hierarchy so
                // their leaves can still rebuild a queue.
                let all_songs = media_id::browse_category_id(MEDIA_ID_BY_SONG, MEDIA_ID_BY_SONG);
                song_items(self.catalog.tracks(), &all_songs)
            }
            [MEDIA_ID_BY_PLAYLIST] => self.playlist_items(),
            [MEDIA_ID_BY_PLAYLIST, playlist] => self.playlist_children(playlist, parent_id),
            _ => {
                warn!(parent_id, "skipping unmatched browse parent");
                Vec::new()
            }
        };
        debug!(parent_id, count = items.len(), "browse children loaded");
        Ok(items)
    }

    fn root_items(&self) -> Vec<BrowseItem> {
        vec![
            BrowseItem::browsable(MEDIA_ID_BY_ARTIST.to_string(), "Artists".to_string(), None),
            BrowseItem::browsable(MEDIA_ID_BY_ALBUM.to_string(), "Albums".to_string(), None),
            BrowseItem::browsable(MEDIA_ID_BY_SONG.to_string(), "Songs".to_string(), None),
            BrowseItem::browsable(
                MEDIA_ID_BY_PLAYLIST.to_string(),
                "Playlists".to_string(),
                None,
            ),
        ]
    }

    fn artist_items(&self) -> Vec<BrowseItem> {
        self.catalog
            .artists()
            .into_iter()
            .map(|artist| {
                BrowseItem::browsable(
                    media_id::browse_category_id(MEDIA_ID_BY_ARTIST, &artist),
                    artist,
                    None,
                )
            })
            .collect()
    }

    fn album_items(&self, albums: Vec<tune_core::AlbumSummary>) -> Vec<BrowseItem> {
        albums
            .into_iter()
            .map(|album| {
                BrowseItem::browsable(
                    media_id::browse_category_id(MEDIA_ID_BY_ALBUM, &album.album),
                    album.album,
                    Some(album.artist),
                )
            })
            .collect()
    }

    fn playlist_items(&self) -> Vec<BrowseItem> {
        self.catalog
            .playlists()
            .into_iter()
            .map(|playlist| {
                BrowseItem::browsable(
                    media_id::browse_category_id(MEDIA_ID_BY_PLAYLIST, &playlist),
                    playlist,
                    None,
                )
            })
            .collect()
    }

    fn playlist_children(&self, playlist: &str, parent_id: &str) -> Vec<BrowseItem> {
        if playlist == MEDIA_ID_NOW_PLAYING {
            let queue = self
                .now_playing
                .read()
                .map(|queue| queue.clone())
                .unwrap_or_default();
            if !queue.is_empty() {
                return queue
                    .iter()
                    .map(|item| BrowseItem::playable(item.media_id.clone(), &item.track))
                    .collect();
            }
        }
        song_items(self.catalog.tracks_by_playlist(playlist), parent_id)
    }
}

fn song_items(tracks: Vec<Track>, parent_id: &str) -> Vec<BrowseItem> {
    let categories = media_id::hierarchy(parent_id);
    tracks
        .into_iter()
        .map(|track| {
            let media_id = media_id::create_media_id(Some(&track.id), &categories);
            BrowseItem::playable(media_id, &track)
        })
        .collect()
}
