//! Media session service - the actor around the session state machine.
//!
//! Transport commands, engine callbacks, art-fetch completions and the
//! idle-stop timer all land in one mpsc mailbox, so the session only ever
//! sees one mutation at a time. Observers get the session's events through
//! a broadcast channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use tune_artwork::ArtworkImages;

use crate::error::{Result, SessionError};
use crate::events::SessionEvent;
use crate::session::PlaybackSession;
use crate::types::{QueueItem, RepeatMode};

/// How long the session lingers after pause/stop before shutting down
pub const STOP_DELAY: Duration = Duration::from_secs(30);

const COMMAND_CHANNEL_CAPACITY: usize = 64;
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Commands a controller can send to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    Play,
    Pause,
    Stop,
    SeekTo { position_ms: u64 },
    SkipToNext,
    SkipToPrevious,
    SkipToQueueItem { queue_id: u64 },
    PlayFromMediaId { media_id: String },
    PlayFromSearch { query: String },
    SetRepeatMode { mode: RepeatMode },
}

#[derive(Debug)]
enum Command {
    Transport(TransportCommand),
    EngineStatusChanged,
    EngineCompleted,
    EngineError(String),
    ArtFetched {
        media_id: String,
        url: String,
        images: ArtworkImages,
    },
    DelayedStop,
}

/// Cloneable handle to a running [`MediaSessionService`].
#[derive(Clone)]
pub struct MediaSessionHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<SessionEvent>,
    queue_snapshot: Arc<RwLock<Vec<QueueItem>>>,
    started: Arc<AtomicBool>,
}

impl MediaSessionHandle {
    /// Send a transport command to the session.
    pub async fn send(&self, command: TransportCommand) -> Result<()> {
        self.commands
            .send(Command::Transport(command))
            .await
            .map_err(|_| SessionError::ChannelClosed)
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Engines call this after every state transition.
    pub async fn notify_engine_status_changed(&self) -> Result<()> {
        self.commands
            .send(Command::EngineStatusChanged)
            .await
            .map_err(|_| SessionError::ChannelClosed)
    }

    /// Engines call this when a track finishes on its own.
    pub async fn notify_engine_completed(&self) -> Result<()> {
        self.commands
            .send(Command::EngineCompleted)
            .await
            .map_err(|_| SessionError::ChannelClosed)
    }

    /// Engines call this when playback fails.
    pub async fn notify_engine_error(&self, message: impl Into<String>) -> Result<()> {
        self.commands
            .send(Command::EngineError(message.into()))
            .await
            .map_err(|_| SessionError::ChannelClosed)
    }

    /// Current playing queue, as last published. Lets the browse surface
    /// list the now-playing pseudo playlist without asking the actor.
    pub fn queue_snapshot(&self) -> Arc<RwLock<Vec<QueueItem>>> {
        self.queue_snapshot.clone()
    }

    /// Whether the session considers itself active, i.e. a play command has
    /// been handled and no stop or idle timeout has happened since.
    pub fn is_session_active(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }
}

/// The actor owning a [`PlaybackSession`].
pub struct MediaSessionService {
    session: PlaybackSession,
    commands: mpsc::Receiver<Command>,
    command_tx: mpsc::Sender<Command>,
    events: broadcast::Sender<SessionEvent>,
    queue_snapshot: Arc<RwLock<Vec<QueueItem>>>,
    delayed_stop: Option<JoinHandle<()>>,
    started: Arc<AtomicBool>,
}

impl MediaSessionService {
    /// Wrap a session into an actor. The service does nothing until
    /// [`MediaSessionService::run`] is spawned.
    pub fn new(session: PlaybackSession) -> (Self, MediaSessionHandle) {
        let (command_tx, commands) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let queue_snapshot = Arc::new(RwLock::new(Vec::new()));
        let started = Arc::new(AtomicBool::new(false));
        let handle = MediaSessionHandle {
            commands: command_tx.clone(),
            events: events.clone(),
            queue_snapshot: queue_snapshot.clone(),
            started: started.clone(),
        };
        let service = Self {
            session,
            commands,
            command_tx,
            events,
            queue_snapshot,
            delayed_stop: None,
            started,
        };
        (service, handle)
    }

    /// Process commands until every handle is dropped.
    ///
    /// Returns an error only on a session consistency failure, which is the
    /// one condition the service will not keep running through.
    pub async fn run(mut self) -> Result<()> {
        while let Some(command) = self.commands.recv().await {
            if matches!(command, Command::DelayedStop) {
                self.on_delayed_stop();
                continue;
            }
            // Only controller activity resets the idle window; engine
            // callbacks and art completions leave a pending timer alive.
            if matches!(command, Command::Transport(_)) {
                self.cancel_delayed_stop();
            }
            let result = self.dispatch(command).await;
            self.flush_session();
            if let Err(e) = result {
                error!("session state is inconsistent, shutting down: {e}");
                self.cancel_delayed_stop();
                return Err(e);
            }
        }
        self.cancel_delayed_stop();
        Ok(())
    }

    async fn dispatch(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Transport(command) => self.dispatch_transport(command).await,
            Command::EngineStatusChanged => {
                self.session.on_status_changed();
                Ok(())
            }
            Command::EngineCompleted => self.session.on_completion(),
            Command::EngineError(message) => {
                self.session.on_error(&message);
                Ok(())
            }
            Command::ArtFetched {
                media_id,
                url,
                images,
            } => {
                self.session.on_art_fetched(&media_id, &url, images);
                Ok(())
            }
            Command::DelayedStop => Ok(()),
        }
    }

    async fn dispatch_transport(&mut self, command: TransportCommand) -> Result<()> {
        if matches!(
            command,
            TransportCommand::Play
                | TransportCommand::PlayFromMediaId { .. }
                | TransportCommand::PlayFromSearch { .. }
        ) {
            // Commands that need the catalog wait for it; they are deferred
            // behind the load rather than dropped.
            let catalog = self.session.catalog().clone();
            if let Err(e) = catalog.ensure_ready().await {
                warn!("music catalog unavailable: {e}");
                self.session
                    .handle_stop_request(Some(format!("Music catalog unavailable: {e}")));
                return Ok(());
            }
            self.started.store(true, Ordering::SeqCst);
        }

        match command {
            TransportCommand::Play => self.session.play(),
            TransportCommand::Pause => {
                self.session.handle_pause_request();
                Ok(())
            }
            TransportCommand::Stop => {
                self.session.handle_stop_request(None);
                Ok(())
            }
            TransportCommand::SeekTo { position_ms } => {
                self.session.handle_seek_to(position_ms);
                Ok(())
            }
            TransportCommand::SkipToNext => self.session.skip_next(),
            TransportCommand::SkipToPrevious => self.session.skip_previous(),
            TransportCommand::SkipToQueueItem { queue_id } => {
                self.session.skip_to_queue_item(queue_id)
            }
            TransportCommand::PlayFromMediaId { media_id } => {
                self.session.play_from_media_id(&media_id)
            }
            TransportCommand::PlayFromSearch { query } => self.session.play_from_search(&query),
            TransportCommand::SetRepeatMode { mode } => {
                self.session.set_repeat_mode(mode);
                Ok(())
            }
        }
    }

    /// Apply everything the last command left behind: service-stop marker,
    /// art fetches, events, and the idle-stop timer.
    fn flush_session(&mut self) {
        if self.session.take_service_stop_request() {
            self.started.store(false, Ordering::SeqCst);
        }
        if let Some(request) = self.session.take_art_request() {
            self.spawn_art_fetch(request.media_id, request.url);
        }
        for event in self.session.take_events() {
            if matches!(event, SessionEvent::QueueChanged { .. }) {
                if let Ok(mut snapshot) = self.queue_snapshot.write() {
                    *snapshot = self.session.queue().to_vec();
                }
            }
            // No receivers is fine; events are best-effort.
            let _ = self.events.send(event);
        }
        if self.session.take_delayed_stop_request() {
            self.arm_delayed_stop();
        }
    }

    fn spawn_art_fetch(&self, media_id: String, url: String) {
        let cache = self.session.art_cache().clone();
        let command_tx = self.command_tx.clone();
        tokio::spawn(async move {
            match cache.fetch(&url).await {
                Ok(images) => {
                    let _ = command_tx
                        .send(Command::ArtFetched {
                            media_id,
                            url,
                            images,
                        })
                        .await;
                }
                Err(e) => warn!(url = %url, "album art fetch failed: {e}"),
            }
        });
    }

    fn arm_delayed_stop(&mut self) {
        self.cancel_delayed_stop();
        let command_tx = self.command_tx.clone();
        self.delayed_stop = Some(tokio::spawn(async move {
            tokio::time::sleep(STOP_DELAY).await;
            let _ = command_tx.send(Command::DelayedStop).await;
        }));
    }

    fn cancel_delayed_stop(&mut self) {
        if let Some(timer) = self.delayed_stop.take() {
            timer.abort();
        }
    }

    fn on_delayed_stop(&mut self) {
        if self.session.is_engine_playing() {
            debug!("ignoring delayed stop since the media player is in use");
            return;
        }
        debug!("stopping session with delay handler");
        self.started.store(false, Ordering::SeqCst);
        let _ = self.events.send(SessionEvent::SessionStopped);
    }
}
