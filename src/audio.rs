//! Playback engine boundary and its `rodio` implementation.
//!
//! The session controller only talks to [`PlaybackEngine`]; [`RodioEngine`]
//! is the production implementation.

mod clock;
mod engine;
mod player;
mod sink;
mod types;

pub use engine::PlaybackEngine;
pub use player::RodioEngine;
pub use types::{CompletionSignal, EngineError, LoadError, MIN_DURATION, Ready};
