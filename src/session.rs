//! Playback session: the state machine that turns user intents and engine
//! events into engine calls, and the thread that serializes them.

mod controller;
mod handle;
mod thread;
mod types;

pub use controller::SessionController;
pub use handle::{SessionHandle, SessionOptions};
pub use types::{
    Intent, PlaybackMode, SessionCmd, SessionPhase, SessionSnapshot, SessionState, SnapshotHandle,
};
