//! Session-level enums, commands and the state published to the UI.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::audio::MIN_DURATION;
use crate::config::PlaybackModeSetting;
use crate::library::{CoverArt, TrackMetadata};

/// What happens when a track plays to its end.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PlaybackMode {
    /// Advance to the next track, wrapping at the end of the catalog.
    #[default]
    PlayAll,
    /// Restart the current track.
    RepeatOne,
}

impl PlaybackMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::PlayAll => Self::RepeatOne,
            Self::RepeatOne => Self::PlayAll,
        }
    }
}

impl From<PlaybackModeSetting> for PlaybackMode {
    fn from(s: PlaybackModeSetting) -> Self {
        match s {
            PlaybackModeSetting::PlayAll => Self::PlayAll,
            PlaybackModeSetting::RepeatOne => Self::RepeatOne,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// No catalog, or an empty one.
    #[default]
    Idle,
    Paused,
    Playing,
    /// The track at the current index failed to load.
    Unplayable,
}

/// User actions forwarded by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    PlayPause,
    Next,
    Previous,
    SeekTo(Duration),
    ToggleMode,
    SelectTrack(usize),
}

/// Everything the session thread consumes, in arrival order.
#[derive(Debug)]
pub enum SessionCmd {
    Intent(Intent),
    /// The engine reached end-of-track for the load numbered `generation`.
    Completed { generation: u64 },
    /// Metadata extracted for the load numbered `generation`.
    Metadata {
        generation: u64,
        metadata: TrackMetadata,
    },
    Shutdown,
}

/// Controller-owned playback state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub index: usize,
    pub phase: SessionPhase,
    pub mode: PlaybackMode,
    pub position: Duration,
    pub duration: Duration,
}

impl SessionState {
    pub fn new(mode: PlaybackMode) -> Self {
        Self {
            index: 0,
            phase: SessionPhase::Idle,
            mode,
            position: Duration::ZERO,
            duration: MIN_DURATION,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == SessionPhase::Playing
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.phase, SessionPhase::Paused | SessionPhase::Playing)
    }
}

/// The state rendered by the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub title: String,
    pub cover: CoverArt,
    pub phase: SessionPhase,
    pub is_playing: bool,
    pub mode: PlaybackMode,
    pub position: Duration,
    pub duration: Duration,
    pub catalog_size: usize,
    pub current_index: Option<usize>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            title: String::new(),
            cover: CoverArt::Default,
            phase: SessionPhase::Idle,
            is_playing: false,
            mode: PlaybackMode::default(),
            position: Duration::ZERO,
            duration: MIN_DURATION,
            catalog_size: 0,
            current_index: None,
        }
    }
}

pub type SnapshotHandle = Arc<Mutex<SessionSnapshot>>;
