use crate::error::{ArtworkError, Result};
use crate::types::{ArtworkImages, FetchedArt};
use async_trait::async_trait;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Maximum artwork size (5MB)
const MAX_ARTWORK_SIZE: usize = 5 * 1024 * 1024;

/// Default number of images kept in the cache
const DEFAULT_CACHE_SIZE: usize = 32;

/// Seam over the actual artwork source.
///
/// Implementations fetch the image for a URL and produce both the full-size
/// image and a scaled icon. The cache never decodes or scales anything
/// itself.
#[async_trait]
pub trait ArtFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedArt>;
}

enum FetchRole {
    Leader,
    Follower(broadcast::Receiver<Option<ArtworkImages>>),
}

/// LRU cache of album art keyed by artwork URL, with single-flight fetches.
///
/// Concurrent requests for the same URL share one underlying fetch; a failed
/// fetch is reported to every waiter and nothing is cached, so the next
/// request retries.
pub struct AlbumArtCache {
    fetcher: Arc<dyn ArtFetcher>,
    cache: Mutex<LruCache<String, ArtworkImages>>,
    in_flight: Mutex<HashMap<String, broadcast::Sender<Option<ArtworkImages>>>>,
}

impl AlbumArtCache {
    /// Create a cache with the default capacity.
    pub fn new(fetcher: Arc<dyn ArtFetcher>) -> Self {
        Self::with_capacity(fetcher, DEFAULT_CACHE_SIZE)
    }

    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(fetcher: Arc<dyn ArtFetcher>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            fetcher,
            cache: Mutex::new(LruCache::new(capacity)),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Cached entry for a URL, without triggering a fetch.
    pub fn peek(&self, url: &str) -> Option<ArtworkImages> {
        self.cache.lock().unwrap().get(url).cloned()
    }

    /// Get the artwork for a URL, fetching it if not cached.
    pub async fn fetch(&self, url: &str) -> Result<ArtworkImages> {
        if let Some(hit) = self.peek(url) {
            return Ok(hit);
        }

        let role = {
            let mut in_flight = self.in_flight.lock().unwrap();
            match in_flight.get(url) {
                Some(tx) => FetchRole::Follower(tx.subscribe()),
                None => {
                    let (tx, _) = broadcast::channel(1);
                    in_flight.insert(url.to_string(), tx);
                    FetchRole::Leader
                }
            }
        };

        match role {
            FetchRole::Leader => {
                let result = self.fetch_and_store(url).await;
                let tx = self.in_flight.lock().unwrap().remove(url);
                if let Some(tx) = tx {
                    // No receivers is fine, nobody else asked.
                    let _ = tx.send(result.as_ref().ok().cloned());
                }
                result
            }
            FetchRole::Follower(mut rx) => match rx.recv().await {
                Ok(Some(images)) => Ok(images),
                Ok(None) | Err(_) => {
                    Err(ArtworkError::fetch(url, "shared fetch did not produce artwork"))
                }
            },
        }
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.cache.lock().unwrap().clear();
    }

    async fn fetch_and_store(&self, url: &str) -> Result<ArtworkImages> {
        tracing::debug!(url, "fetching album art");
        let fetched = self.fetcher.fetch(url).await?;
        if fetched.big.len() > MAX_ARTWORK_SIZE {
            return Err(ArtworkError::TooLarge {
                url: url.to_string(),
                size: fetched.big.len(),
                max: MAX_ARTWORK_SIZE,
            });
        }
        let images = ArtworkImages {
            big: Arc::new(fetched.big),
            icon: Arc::new(fetched.icon),
        };
        self.cache
            .lock()
            .unwrap()
            .put(url.to_string(), images.clone());
        Ok(images)
    }
}
