//! Seam between the session coordinator and the actual audio pipeline.

use crate::types::{PlaybackState, QueueItem};

/// The audio collaborator: decoding, output, focus handling all live behind
/// this trait.
///
/// Calls are fire-and-forget; the engine reports back asynchronously through
/// the session's callback surface (status changed, completion, error), which
/// the service feeds into the actor mailbox. An engine implementation must
/// answer the three query methods from its own current state.
pub trait PlaybackEngine: Send {
    /// Start or restart playback of a queue item.
    fn play(&mut self, item: &QueueItem);

    /// Pause, keeping position for a later resume.
    fn pause(&mut self);

    /// Stop playback. `notify` asks the engine to report the resulting
    /// state change through its status callback.
    fn stop(&mut self, notify: bool);

    /// Seek within the current track.
    fn seek_to(&mut self, position_ms: u64);

    /// Whether audio is currently audible.
    fn is_playing(&self) -> bool;

    /// Current stream position in milliseconds.
    fn position_ms(&self) -> u64;

    /// Current engine state.
    fn state(&self) -> PlaybackState;
}
