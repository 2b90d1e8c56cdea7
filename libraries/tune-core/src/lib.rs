//! Tune Player Core
//!
//! Platform-agnostic core types for Tune Player: the track domain type,
//! the hierarchy-aware media-id codec, and the in-memory music catalog
//! with asynchronous initial load.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`
//! - **Media IDs**: composite ids encoding the browse path a track was
//!   selected from (`media_id` module)
//! - **Catalog**: `MusicCatalog` + the `CatalogSource` seam for whatever
//!   actually scans tracks (filesystem, media store, remote)
//! - **Error Handling**: unified `CoreError` and `Result` types

#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod media_id;
pub mod types;

// Re-export commonly used types
pub use catalog::{CatalogSource, CatalogState, MusicCatalog};
pub use error::{CoreError, Result};
pub use types::{AlbumSummary, Track, TrackId};
