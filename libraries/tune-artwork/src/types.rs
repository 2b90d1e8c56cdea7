use std::sync::Arc;

/// A cached artwork entry: the full-size image plus a small icon.
///
/// Both buffers are shared, so cloning an entry is cheap and callers can
/// hold on to the bytes without pinning the cache entry.
#[derive(Debug, Clone)]
pub struct ArtworkImages {
    /// Full-size image bytes (encoded, e.g. PNG/JPEG)
    pub big: Arc<Vec<u8>>,
    /// Scaled-down icon bytes for notification surfaces
    pub icon: Arc<Vec<u8>>,
}

/// Raw fetch result produced by an [`crate::ArtFetcher`].
///
/// The fetcher is responsible for producing both sizes; the cache only
/// stores what it is given.
#[derive(Debug, Clone)]
pub struct FetchedArt {
    pub big: Vec<u8>,
    pub icon: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloned_images_share_buffers() {
        let images = ArtworkImages {
            big: Arc::new(vec![1, 2, 3]),
            icon: Arc::new(vec![4]),
        };
        let copy = images.clone();
        assert!(Arc::ptr_eq(&images.big, &copy.big));
        assert!(Arc::ptr_eq(&images.icon, &copy.icon));
    }
}
