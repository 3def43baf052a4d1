use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/playdeck/config.toml`, else
/// `~/.config/playdeck/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `PLAYDECK__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub playback: PlaybackSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub log: LogSettings,
}

/// Named extension allow-lists.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtensionPreset {
    /// mp3, wav, m4a, flac, ogg, aac
    #[serde(alias = "full")]
    All,
    /// Only `.mp3` files.
    #[serde(alias = "mp3_only", alias = "mp3")]
    Mp3Only,
}

impl ExtensionPreset {
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::All => &["mp3", "wav", "m4a", "flac", "ogg", "aac"],
            Self::Mp3Only => &["mp3"],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directory (or media index file) used when no path is given on the command line.
    pub root: Option<PathBuf>,
    /// Built-in extension allow-list.
    pub preset: ExtensionPreset,
    /// Explicit extensions (case-insensitive, without dot). Overrides `preset` when set.
    pub extensions: Option<Vec<String>>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
    /// Embedded pictures larger than this are not decoded.
    pub max_artwork_bytes: usize,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            root: None,
            preset: ExtensionPreset::All,
            extensions: None,
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
            max_artwork_bytes: 5 * 1024 * 1024,
        }
    }
}

impl LibrarySettings {
    /// The effective allow-list: lower-cased, without leading dots, empty entries removed.
    pub fn allowed_extensions(&self) -> BTreeSet<String> {
        match &self.extensions {
            Some(list) => list
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            None => self
                .preset
                .extensions()
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Mode the session starts in.
    pub mode: PlaybackModeSetting,
    /// How often the playing position is republished (milliseconds).
    pub poll_interval_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            mode: PlaybackModeSetting::PlayAll,
            poll_interval_ms: 100,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaybackModeSetting {
    #[serde(alias = "play_all", alias = "playall", alias = "loop-all")]
    PlayAll,
    #[serde(alias = "repeat_one", alias = "repeatone", alias = "loop-one")]
    RepeatOne,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Whether the track list panel is shown below the player.
    pub show_track_list: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ playdeck ~ ".to_string(),
            show_track_list: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds the scrub preview moves when pressing `H` / `L`.
    pub scrub_seconds: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { scrub_seconds: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter directive when `PLAYDECK_LOG` is unset.
    pub level: String,
    /// Log file; defaults to the XDG state directory.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
