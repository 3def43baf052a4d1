use std::path::PathBuf;
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink, mixer::Mixer};
use tracing::{debug, warn};

use crate::library::Track;

use super::clock::PlayClock;
use super::engine::PlaybackEngine;
use super::sink::{create_sink_at, header_duration};
use super::types::{CompletionSignal, EngineError, LoadError, Ready};

/// The track currently bound to the output.
struct Bound {
    path: PathBuf,
    sink: Sink,
    duration: Duration,
    clock: PlayClock,
    playing: bool,
    completion: Option<CompletionSignal>,
}

/// `PlaybackEngine` on top of a `rodio` mixer and a single `Sink`.
///
/// Must be created and used on one thread: the output stream is not `Send`
/// on every platform.
pub struct RodioEngine {
    mixer: Mixer,
    bound: Option<Bound>,
    // Keeps the device open; `None` when something else drains `mixer`.
    _stream: Option<OutputStream>,
}

impl RodioEngine {
    pub fn open_default() -> Result<Self, EngineError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| EngineError::Output(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped, which would
        // scribble over the terminal UI.
        stream.log_on_drop(false);
        let mut engine = Self::with_mixer(stream.mixer().clone());
        engine._stream = Some(stream);
        Ok(engine)
    }

    /// An engine feeding `mixer` without owning an output device.
    pub(crate) fn with_mixer(mixer: Mixer) -> Self {
        Self {
            mixer,
            bound: None,
            _stream: None,
        }
    }

    /// Replace the bound sink with a fresh one positioned at `position`.
    fn rebuild(&mut self, position: Duration) {
        let Some(b) = self.bound.as_mut() else {
            return;
        };
        b.sink.stop();
        match create_sink_at(&self.mixer, &b.path, position) {
            Ok((sink, _)) => {
                if b.playing {
                    sink.play();
                }
                b.sink = sink;
            }
            Err(err) => warn!(%err, "could not reopen track for seeking"),
        }
    }
}

impl PlaybackEngine for RodioEngine {
    fn load(&mut self, track: &Track) -> Result<Ready, LoadError> {
        self.dispose();

        let (sink, decoder_total) = create_sink_at(&self.mixer, &track.path, Duration::ZERO)?;
        let duration = decoder_total
            .filter(|d| !d.is_zero())
            .or_else(|| header_duration(&track.path))
            .unwrap_or_else(|| {
                warn!(path = %track.path.display(), "track duration unknown");
                Duration::ZERO
            });
        let ready = Ready::new(duration);

        debug!(
            path = %track.path.display(),
            duration_ms = ready.duration.as_millis() as u64,
            "decoder bound"
        );
        self.bound = Some(Bound {
            path: track.path.clone(),
            sink,
            duration: ready.duration,
            clock: PlayClock::default(),
            playing: false,
            completion: None,
        });
        Ok(ready)
    }

    fn start(&mut self) {
        let needs_restart = match self.bound.as_mut() {
            Some(b) => {
                b.playing = true;
                b.clock.start(Instant::now());
                b.sink.play();
                b.sink.empty()
            }
            None => false,
        };
        if needs_restart {
            self.rebuild(Duration::ZERO);
            if let Some(b) = self.bound.as_mut() {
                b.clock.set(Duration::ZERO, Instant::now());
            }
        }
    }

    fn pause(&mut self) {
        if let Some(b) = self.bound.as_mut() {
            b.playing = false;
            b.clock.pause(Instant::now());
            b.sink.pause();
        }
    }

    fn seek(&mut self, position: Duration) {
        let needs_rebuild = match self.bound.as_mut() {
            Some(b) => {
                let target = position.min(b.duration);
                b.clock.set(target, Instant::now());
                b.sink.empty() || b.sink.try_seek(target).is_err()
            }
            None => return,
        };
        if needs_rebuild {
            let target = position.min(self.duration());
            self.rebuild(target);
        }
    }

    fn position(&self) -> Duration {
        self.bound
            .as_ref()
            .map_or(Duration::ZERO, |b| {
                b.clock.elapsed(Instant::now()).min(b.duration)
            })
    }

    fn duration(&self) -> Duration {
        self.bound.as_ref().map_or(Duration::ZERO, |b| b.duration)
    }

    fn on_completion(&mut self, signal: CompletionSignal) {
        if let Some(b) = self.bound.as_mut() {
            b.completion = Some(signal);
        }
    }

    fn poll(&mut self) {
        let Some(b) = self.bound.as_mut() else {
            return;
        };
        if b.playing && b.sink.empty() {
            b.playing = false;
            b.clock.pause(Instant::now());
            b.clock.set(b.duration, Instant::now());
            if let Some(signal) = b.completion.take() {
                debug!(path = %b.path.display(), "end of track");
                signal.fire();
            }
        }
    }

    fn dispose(&mut self) {
        if let Some(b) = self.bound.take() {
            b.sink.stop();
            debug!(path = %b.path.display(), "decoder released");
        }
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}
