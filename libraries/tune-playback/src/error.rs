//! Error types for the playback session

use thiserror::Error;

/// Errors raised by the playback session.
///
/// Almost every failure in the session is absorbed and surfaced as a
/// published playback status (an `Error` state with a message), because a
/// remote controller can only act on published state. The variants here are
/// the exceptions that genuinely abort the command.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The track resolved from the catalog does not match the id embedded in
    /// the queue item's media id. The queue and the catalog disagree about
    /// what is playing, so no published state can be trusted.
    #[error("track id mismatch for queue item {media_id}: catalog resolved {resolved:?}")]
    CatalogMismatch {
        media_id: String,
        resolved: Option<String>,
    },

    /// The session actor is gone and cannot receive commands
    #[error("media session command channel closed")]
    ChannelClosed,
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
