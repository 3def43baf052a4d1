use std::sync::mpsc::{self, SendError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::debug;

use crate::audio::{EngineError, PlaybackEngine};
use crate::library::{Catalog, MetadataProvider};

use super::thread::{SessionSetup, spawn_session_thread};
use super::types::{Intent, PlaybackMode, SessionCmd, SessionSnapshot, SnapshotHandle};

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub mode: PlaybackMode,
    pub poll_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            mode: PlaybackMode::PlayAll,
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// The presentation layer's side of a running session.
///
/// Dropping the handle shuts the session down and waits for its thread.
pub struct SessionHandle {
    tx: Sender<SessionCmd>,
    snapshot: SnapshotHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl SessionHandle {
    pub fn spawn<E, F>(
        catalog: Arc<Catalog>,
        make_engine: F,
        metadata: Arc<dyn MetadataProvider>,
        options: SessionOptions,
    ) -> Result<Self, EngineError>
    where
        E: PlaybackEngine,
        F: FnOnce() -> Result<E, EngineError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<SessionCmd>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let snapshot = SnapshotHandle::default();

        let setup = SessionSetup {
            catalog,
            metadata,
            mode: options.mode,
            poll_interval: options.poll_interval,
            tx: tx.clone(),
            rx,
            snapshot: snapshot.clone(),
        };
        let join = spawn_session_thread(setup, make_engine, ready_tx)?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                tx,
                snapshot,
                join: Mutex::new(Some(join)),
            }),
            Ok(Err(err)) => {
                let _ = join.join();
                Err(err)
            }
            Err(_) => {
                let _ = join.join();
                Err(EngineError::Startup)
            }
        }
    }

    /// A copy of the latest published state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn send(&self, intent: Intent) -> Result<(), SendError<SessionCmd>> {
        self.tx.send(SessionCmd::Intent(intent))
    }

    /// Stop the session thread and wait for it. Later calls do nothing.
    pub fn shutdown(&self) {
        let Ok(mut join) = self.join.lock() else {
            return;
        };
        if let Some(handle) = join.take() {
            let _ = self.tx.send(SessionCmd::Shutdown);
            let _ = handle.join();
            debug!("session thread joined");
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
