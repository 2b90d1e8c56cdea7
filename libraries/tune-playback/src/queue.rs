//! Playing-queue construction and lookup.
//!
//! Queues are built from a hierarchy-aware media id, so the queue itself
//! records where it came from: each item's media id embeds the browse
//! category it was selected in. Queues are immutable after construction and
//! the build index doubles as the queue id.

use thiserror::Error;
use tune_core::media_id::{
    self, MEDIA_ID_BY_ALBUM, MEDIA_ID_BY_ARTIST, MEDIA_ID_BY_PLAYLIST, MEDIA_ID_BY_SEARCH,
    MEDIA_ID_BY_SONG,
};
use tune_core::{MusicCatalog, Track};

use crate::types::QueueItem;

/// Why a queue could not be built from a media id.
///
/// An empty queue is a valid build result; these are failures to build at
/// all, and the session treats them differently (log and abort, rather than
/// publish an empty queue).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueBuildError {
    /// The media id does not have the `[category, value]` shape
    #[error("media id {0} is not a two-level browse hierarchy")]
    InvalidMediaId(String),

    /// The category exists but queues cannot be built from it
    #[error("building a queue by {0} is not supported")]
    Unsupported(String),

    /// The category is not one the catalog knows
    #[error("unrecognized category {category} in media id {media_id}")]
    UnknownCategory { category: String, media_id: String },
}

/// Build the playing queue for a hierarchy-aware media id.
///
/// The hierarchy must be exactly `[category, value]`. Tracks are taken in
/// catalog order and each item gets a media id that preserves the category
/// the queue was built from.
pub fn build_queue(
    media_id: &str,
    catalog: &MusicCatalog,
) -> Result<Vec<QueueItem>, QueueBuildError> {
    let hierarchy = media_id::hierarchy(media_id);
    if hierarchy.len() != 2 {
        return Err(QueueBuildError::InvalidMediaId(media_id.to_string()));
    }
    let category = hierarchy[0];
    let value = hierarchy[1];
    tracing::debug!(category, value, "creating playing queue");

    let tracks = match category {
        // The value is ignored for by-song: the queue is the whole catalog.
        MEDIA_ID_BY_SONG => catalog.tracks(),
        MEDIA_ID_BY_ALBUM => catalog.tracks_by_album(value),
        MEDIA_ID_BY_PLAYLIST => catalog.tracks_by_playlist(value),
        MEDIA_ID_BY_SEARCH => catalog.search(value),
        MEDIA_ID_BY_ARTIST => {
            return Err(QueueBuildError::Unsupported(category.to_string()));
        }
        other => {
            return Err(QueueBuildError::UnknownCategory {
                category: other.to_string(),
                media_id: media_id.to_string(),
            });
        }
    };
    Ok(to_queue(tracks, category, value))
}

/// Build a queue from a title search. An empty result is a valid queue.
pub fn search_queue(query: &str, catalog: &MusicCatalog) -> Vec<QueueItem> {
    tracing::debug!(query, "creating playing queue from search");
    to_queue(catalog.search(query), MEDIA_ID_BY_SEARCH, query)
}

/// Build the fallback queue used when playback starts with nothing queued.
///
/// Instead of actual randomness this takes the first artist in catalog
/// order, which keeps the choice reproducible. An empty catalog yields an
/// empty queue.
pub fn default_queue(catalog: &MusicCatalog) -> Vec<QueueItem> {
    let Some(artist) = catalog.artists().into_iter().next() else {
        return Vec::new();
    };
    let tracks = catalog.tracks_by_artist(&artist);
    to_queue(tracks, MEDIA_ID_BY_ARTIST, &artist)
}

/// Position of the first item with this exact media id.
pub fn index_of_media_id(queue: &[QueueItem], media_id: &str) -> Option<usize> {
    queue.iter().position(|item| item.media_id == media_id)
}

/// Position of the item with this queue id.
pub fn index_of_queue_id(queue: &[QueueItem], queue_id: u64) -> Option<usize> {
    queue.iter().position(|item| item.queue_id == queue_id)
}

/// Whether a cursor value points at a real queue entry.
///
/// The cursor is signed so that "no current item" (-1, or past the end) can
/// flow through arithmetic; every dereference goes through this guard.
pub fn is_index_playable(index: i64, queue: &[QueueItem]) -> bool {
    index >= 0 && (index as usize) < queue.len()
}

fn to_queue(tracks: Vec<Track>, category: &str, value: &str) -> Vec<QueueItem> {
    tracks
        .into_iter()
        .enumerate()
        .map(|(position, track)| QueueItem {
            queue_id: position as u64,
            media_id: media_id::create_media_id(Some(&track.id), &[category, value]),
            track,
        })
        .collect()
}
