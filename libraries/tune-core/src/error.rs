/// Core error types for Tune Player
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Tune Player
#[derive(Error, Debug)]
pub enum CoreError {
    /// Catalog failed to initialize or is unavailable
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Catalog source failed while loading media
    #[error("Catalog source error: {0}")]
    Source(String),
}

impl CoreError {
    /// Create a catalog source error
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create a catalog-unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::CatalogUnavailable(msg.into())
    }
}
