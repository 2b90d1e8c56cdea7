use thiserror::Error;

/// Errors that can occur while fetching or caching artwork
#[derive(Debug, Error)]
pub enum ArtworkError {
    /// The remote or on-disk source could not produce the image
    #[error("failed to fetch artwork from {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The fetched image exceeds the size limit
    #[error("artwork at {url} too large: {size} bytes (max {max})")]
    TooLarge { url: String, size: usize, max: usize },
}

impl ArtworkError {
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for artwork operations
pub type Result<T> = std::result::Result<T, ArtworkError>;
