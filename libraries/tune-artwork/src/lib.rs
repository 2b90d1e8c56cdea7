//! Album artwork cache.
//!
//! Keeps decoded album art in an in-memory LRU keyed by artwork URL, in two
//! sizes: the full image for the lock-screen/session surface and a small icon
//! for notifications. Fetching and scaling live behind the [`ArtFetcher`]
//! seam; the cache makes sure a given URL is only fetched once even when
//! several callers race for it.

mod cache;
mod error;
mod types;

pub use cache::{AlbumArtCache, ArtFetcher};
pub use error::{ArtworkError, Result};
pub use types::{ArtworkImages, FetchedArt};
