use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::error;

use crate::audio::{EngineError, PlaybackEngine};
use crate::library::{Catalog, MetadataProvider};

use super::controller::SessionController;
use super::types::{PlaybackMode, SessionCmd, SnapshotHandle};

pub(super) struct SessionSetup {
    pub catalog: Arc<Catalog>,
    pub metadata: Arc<dyn MetadataProvider>,
    pub mode: PlaybackMode,
    pub poll_interval: Duration,
    pub tx: Sender<SessionCmd>,
    pub rx: Receiver<SessionCmd>,
    pub snapshot: SnapshotHandle,
}

/// Spawn the thread that owns the engine and the controller.
///
/// The engine is built on the new thread; whether that worked is reported on
/// `ready` before any command is processed.
pub(super) fn spawn_session_thread<E, F>(
    setup: SessionSetup,
    make_engine: F,
    ready: Sender<Result<(), EngineError>>,
) -> std::io::Result<JoinHandle<()>>
where
    E: PlaybackEngine,
    F: FnOnce() -> Result<E, EngineError> + Send + 'static,
{
    thread::Builder::new()
        .name("session".into())
        .spawn(move || {
            let engine = match make_engine() {
                Ok(engine) => {
                    let _ = ready.send(Ok(()));
                    engine
                }
                Err(err) => {
                    error!(%err, "audio engine unavailable");
                    let _ = ready.send(Err(err));
                    return;
                }
            };

            let mut controller = SessionController::new(
                setup.catalog,
                engine,
                setup.metadata,
                setup.tx,
                setup.snapshot,
                setup.mode,
            );
            controller.start();

            run_loop(&mut controller, &setup.rx, setup.poll_interval);
            controller.teardown();
        })
}

/// Serve commands until `Shutdown`, ticking every `poll_interval` while playing.
///
/// While paused or idle the loop blocks on the queue instead of waking up.
pub(super) fn run_loop<E: PlaybackEngine>(
    controller: &mut SessionController<E>,
    rx: &Receiver<SessionCmd>,
    poll_interval: Duration,
) {
    let mut next_tick = Instant::now() + poll_interval;

    loop {
        let was_playing = controller.state().is_playing();

        let cmd = if was_playing {
            let now = Instant::now();
            if now >= next_tick {
                controller.tick();
                next_tick = now + poll_interval;
                continue;
            }
            match rx.recv_timeout(next_tick - now) {
                Ok(cmd) => cmd,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match rx.recv() {
                Ok(cmd) => cmd,
                Err(_) => break,
            }
        };

        if matches!(cmd, SessionCmd::Shutdown) {
            break;
        }
        controller.handle(cmd);

        if !was_playing && controller.state().is_playing() {
            next_tick = Instant::now() + poll_interval;
        }
    }
}
