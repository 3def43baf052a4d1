//! Small types shared by engine implementations and their callers.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Shortest duration an engine reports, so progress ratios never divide by zero.
pub const MIN_DURATION: Duration = Duration::from_millis(1);

/// Outcome of a successful `load`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Ready {
    pub duration: Duration,
}

impl Ready {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration: duration.max(MIN_DURATION),
        }
    }
}

/// Why a track could not be bound to the decoder.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
}

/// Failure to bring up the audio output itself.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no audio output device: {0}")]
    Output(String),
    #[error("session thread stopped before the engine was ready")]
    Startup,
    #[error("cannot start session thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// One-shot end-of-track notification. Firing consumes it.
pub struct CompletionSignal {
    notify: Box<dyn FnOnce() + Send>,
}

impl CompletionSignal {
    pub fn new(notify: impl FnOnce() + Send + 'static) -> Self {
        Self {
            notify: Box::new(notify),
        }
    }

    pub fn fire(self) {
        (self.notify)();
    }
}

impl fmt::Debug for CompletionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CompletionSignal")
    }
}
