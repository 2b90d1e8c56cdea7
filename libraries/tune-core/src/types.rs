//! Core domain types for Tune Player

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Unique, non-hierarchical track identifier as assigned by the catalog.
pub type TrackId = String;

/// Immutable catalog entry.
///
/// Owned by the catalog; the playback side only ever clones it into
/// queue items and metadata snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Album name
    pub album: String,

    /// Track duration
    pub duration: Duration,

    /// Artwork reference, if the track has one (URL or URI string)
    pub art_url: Option<String>,

    /// Source locator for the decodable audio (path or URI)
    pub source: String,
}

/// Aggregate view of one album, as exposed by the browse surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumSummary {
    /// Album name
    pub album: String,

    /// Artist name
    pub artist: String,

    /// Number of tracks in the album
    pub track_count: usize,

    /// Artwork of the first track that carried one
    pub art_url: Option<String>,
}
