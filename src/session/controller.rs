use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::audio::{CompletionSignal, MIN_DURATION, PlaybackEngine};
use crate::library::{Catalog, CoverArt, MetadataProvider, Track, TrackMetadata, display_title};

use super::types::{
    Intent, PlaybackMode, SessionCmd, SessionPhase, SessionSnapshot, SessionState, SnapshotHandle,
};

/// The playback-session state machine.
///
/// Owns the engine and the session state. Every transition runs through
/// [`SessionController::handle`], so callers must feed it from a single
/// serialized queue. Completion signals and metadata results are posted back
/// into that queue through `outbox`, tagged with the load generation they
/// belong to.
pub struct SessionController<E: PlaybackEngine> {
    catalog: Arc<Catalog>,
    engine: E,
    metadata: Arc<dyn MetadataProvider>,
    outbox: Sender<SessionCmd>,
    snapshot: SnapshotHandle,
    state: SessionState,
    title: String,
    cover: CoverArt,
    generation: u64,
    torn_down: bool,
}

impl<E: PlaybackEngine> SessionController<E> {
    pub fn new(
        catalog: Arc<Catalog>,
        engine: E,
        metadata: Arc<dyn MetadataProvider>,
        outbox: Sender<SessionCmd>,
        snapshot: SnapshotHandle,
        mode: PlaybackMode,
    ) -> Self {
        let controller = Self {
            catalog,
            engine,
            metadata,
            outbox,
            snapshot,
            state: SessionState::new(mode),
            title: String::new(),
            cover: CoverArt::Default,
            generation: 0,
            torn_down: false,
        };
        controller.publish();
        controller
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Load the first track, paused. No-op on an empty catalog.
    pub fn start(&mut self) {
        info!(tracks = self.catalog.len(), "session started");
        if !self.catalog.is_empty() {
            self.load_index(0, false);
        }
        self.publish();
    }

    pub fn handle(&mut self, cmd: SessionCmd) {
        match cmd {
            SessionCmd::Intent(intent) => self.handle_intent(intent),
            SessionCmd::Completed { generation } => self.handle_completion(generation),
            SessionCmd::Metadata {
                generation,
                metadata,
            } => self.apply_metadata(generation, metadata),
            SessionCmd::Shutdown => self.teardown(),
        }
        self.publish();
    }

    fn handle_intent(&mut self, intent: Intent) {
        if self.torn_down || self.catalog.is_empty() {
            return;
        }
        debug!(?intent, phase = ?self.state.phase, index = self.state.index, "intent");

        let len = self.catalog.len();
        match intent {
            Intent::PlayPause => match self.state.phase {
                SessionPhase::Paused => {
                    // A completion consumed while paused leaves the engine unarmed.
                    self.arm_completion();
                    self.engine.start();
                    self.state.phase = SessionPhase::Playing;
                }
                SessionPhase::Playing => {
                    self.engine.pause();
                    self.state.position = self.engine.position();
                    self.state.phase = SessionPhase::Paused;
                }
                SessionPhase::Idle | SessionPhase::Unplayable => {}
            },
            Intent::Next => self.load_index((self.state.index + 1) % len, true),
            Intent::Previous => {
                let prev = if self.state.index == 0 {
                    len - 1
                } else {
                    self.state.index - 1
                };
                self.load_index(prev, true);
            }
            Intent::SelectTrack(index) => {
                if index < len {
                    self.load_index(index, true);
                }
            }
            Intent::ToggleMode => {
                self.state.mode = self.state.mode.toggled();
                info!(mode = ?self.state.mode, "playback mode changed");
                self.load_index(self.state.index, true);
            }
            Intent::SeekTo(position) => {
                if self.state.is_loaded() {
                    let target = position.min(self.state.duration);
                    self.engine.seek(target);
                    self.state.position = target;
                }
            }
        }
    }

    fn handle_completion(&mut self, generation: u64) {
        if generation != self.generation || self.state.phase != SessionPhase::Playing {
            debug!(generation, current = self.generation, "ignoring stale completion");
            return;
        }

        match self.state.mode {
            PlaybackMode::PlayAll => {
                let next = (self.state.index + 1) % self.catalog.len();
                self.load_index(next, true);
            }
            PlaybackMode::RepeatOne => {
                self.engine.seek(Duration::ZERO);
                self.engine.start();
                self.state.position = Duration::ZERO;
                self.state.phase = SessionPhase::Playing;
                self.arm_completion();
            }
        }
    }

    fn apply_metadata(&mut self, generation: u64, metadata: TrackMetadata) {
        if generation != self.generation {
            return;
        }
        if let Some(track) = self.catalog.get(self.state.index) {
            self.title = display_title(metadata.title.as_deref(), &track.path);
        }
        self.cover = CoverArt::from_artwork(metadata.artwork);
    }

    /// Republish the engine position. Only does work while playing.
    pub fn tick(&mut self) {
        if self.torn_down || !self.state.is_playing() {
            return;
        }
        self.engine.poll();
        self.state.position = self.engine.position();
        self.publish();
    }

    /// Release the engine. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.engine.dispose();
        if self.state.is_playing() {
            self.state.phase = SessionPhase::Paused;
        }
        info!("session ended");
        self.publish();
    }

    /// Bind the track at `index`; the previous decoder is released by the engine.
    fn load_index(&mut self, index: usize, autoplay: bool) {
        let catalog = Arc::clone(&self.catalog);
        let Some(track) = catalog.get(index) else {
            return;
        };

        self.generation += 1;
        self.state.index = index;
        self.state.position = Duration::ZERO;
        self.title = display_title(None, &track.path);
        self.cover = CoverArt::Default;

        match self.engine.load(track) {
            Ok(ready) => {
                self.state.duration = ready.duration;
                self.arm_completion();
                if autoplay {
                    self.engine.start();
                    self.state.phase = SessionPhase::Playing;
                } else {
                    self.state.phase = SessionPhase::Paused;
                }
                self.request_metadata(track);
                debug!(index, generation = self.generation, autoplay, "track loaded");
            }
            Err(err) => {
                warn!(index, %err, "track is unplayable");
                self.engine.dispose();
                self.state.duration = MIN_DURATION;
                self.state.phase = SessionPhase::Unplayable;
            }
        }
    }

    fn arm_completion(&mut self) {
        let tx = self.outbox.clone();
        let generation = self.generation;
        self.engine.on_completion(CompletionSignal::new(move || {
            let _ = tx.send(SessionCmd::Completed { generation });
        }));
    }

    /// Extract metadata off the session thread; the result comes back as a
    /// `SessionCmd::Metadata` message.
    fn request_metadata(&self, track: &Track) {
        let provider = Arc::clone(&self.metadata);
        let tx = self.outbox.clone();
        let path = track.path.clone();
        let generation = self.generation;

        let spawned = thread::Builder::new()
            .name("metadata".into())
            .spawn(move || {
                let metadata = provider.extract(&path);
                let _ = tx.send(SessionCmd::Metadata {
                    generation,
                    metadata,
                });
            });
        if let Err(err) = spawned {
            warn!(%err, "could not spawn metadata worker");
        }
    }

    fn publish(&self) {
        let Ok(mut snap) = self.snapshot.lock() else {
            return;
        };
        *snap = SessionSnapshot {
            title: self.title.clone(),
            cover: self.cover.clone(),
            phase: self.state.phase,
            is_playing: self.state.is_playing(),
            mode: self.state.mode,
            position: self.state.position,
            duration: self.state.duration,
            catalog_size: self.catalog.len(),
            current_index: (!self.catalog.is_empty()).then_some(self.state.index),
        };
    }
}

impl<E: PlaybackEngine> Drop for SessionController<E> {
    fn drop(&mut self) {
        self.teardown();
    }
}
