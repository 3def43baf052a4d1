use std::time::Duration;

use crate::library::Track;

use super::types::{CompletionSignal, LoadError, Ready};

/// The boundary around the decoder/output primitive.
///
/// An engine holds at most one bound track. Transport calls made while nothing
/// is bound are ignored. Engines never advance to another track on their own;
/// they only report end-of-track through the armed [`CompletionSignal`].
pub trait PlaybackEngine {
    /// Release whatever is bound, then bind and prepare `track` (paused at 0).
    fn load(&mut self, track: &Track) -> Result<Ready, LoadError>;

    fn start(&mut self);

    fn pause(&mut self);

    /// Move to `position`, clamped to `[0, duration]`. Play/pause is unchanged.
    fn seek(&mut self, position: Duration);

    fn position(&self) -> Duration;

    /// Fixed at load time; zero when nothing is bound.
    fn duration(&self) -> Duration;

    /// Arm the end-of-track notification for the bound track.
    fn on_completion(&mut self, signal: CompletionSignal);

    /// Give the engine a chance to notice end-of-track. Called on every
    /// position tick while playing.
    fn poll(&mut self) {}

    /// Release the decoder. Safe to call any number of times.
    fn dispose(&mut self);
}
