use super::load::{default_config_path, default_log_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

/// Sets (or clears) one variable and restores the previous value on drop.
struct EnvGuard {
    key: &'static str,
    saved: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn apply(key: &'static str, value: Option<&str>) -> Self {
        let saved = std::env::var_os(key);
        // SAFETY: every test touching the environment holds `env_lock()`.
        unsafe {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
        Self { key, saved }
    }

    fn set(key: &'static str, value: &str) -> Self {
        Self::apply(key, Some(value))
    }

    fn remove(key: &'static str) -> Self {
        Self::apply(key, None)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: see `apply`.
        unsafe {
            match self.saved.take() {
                Some(v) => std::env::set_var(self.key, v),
                None => std::env::remove_var(self.key),
            }
        }
    }
}

#[test]
fn resolve_config_path_prefers_playdeck_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("PLAYDECK_CONFIG_PATH", "/tmp/playdeck-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/playdeck-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    assert_eq!(
        default_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("playdeck")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("playdeck")
            .join("config.toml")
    );
}

#[test]
fn default_log_path_uses_xdg_state_home_then_local_state() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_STATE_HOME", "/tmp/xdg-state");
    assert_eq!(
        default_log_path().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-state")
            .join("playdeck")
            .join("playdeck.log")
    );

    let _g2 = EnvGuard::remove("XDG_STATE_HOME");
    let _g3 = EnvGuard::set("HOME", "/tmp/home-dir");
    assert_eq!(
        default_log_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".local/state")
            .join("playdeck")
            .join("playdeck.log")
    );
}

#[test]
fn default_allow_list_is_the_full_preset() {
    let s = LibrarySettings::default();
    let exts: Vec<String> = s.allowed_extensions().into_iter().collect();
    assert_eq!(exts, vec!["aac", "flac", "m4a", "mp3", "ogg", "wav"]);
}

#[test]
fn explicit_extensions_override_preset_and_are_normalized() {
    let s = LibrarySettings {
        preset: ExtensionPreset::Mp3Only,
        extensions: Some(vec![" .FLAC ".into(), "Ogg".into(), "".into()]),
        ..LibrarySettings::default()
    };
    let exts: Vec<String> = s.allowed_extensions().into_iter().collect();
    assert_eq!(exts, vec!["flac", "ogg"]);
}

#[test]
fn validate_rejects_zero_poll_interval_and_empty_allow_list() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.playback.poll_interval_ms = 0;
    assert!(s.validate().is_err());

    s.playback.poll_interval_ms = 100;
    s.library.extensions = Some(vec!["  ".into()]);
    assert!(s.validate().is_err());
}

#[test]
fn settings_load_from_config_file_and_parse_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[library]
root = "/srv/music"
preset = "mp3-only"
recursive = false
include_hidden = true
follow_links = false
max_depth = 3

[playback]
mode = "repeat_one"
poll_interval_ms = 250

[ui]
header_text = "hello"
show_track_list = false

[controls]
scrub_seconds = 9

[log]
level = "debug"
file = "/tmp/playdeck.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("PLAYDECK_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("PLAYDECK__PLAYBACK__POLL_INTERVAL_MS");

    let s = Settings::load().unwrap();
    assert_eq!(s.library.root, Some(std::path::PathBuf::from("/srv/music")));
    assert_eq!(s.library.preset, ExtensionPreset::Mp3Only);
    assert!(!s.library.recursive);
    assert!(s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert_eq!(s.library.max_depth, Some(3));
    assert_eq!(s.playback.mode, PlaybackModeSetting::RepeatOne);
    assert_eq!(s.playback.poll_interval_ms, 250);
    assert_eq!(s.ui.header_text, "hello");
    assert!(!s.ui.show_track_list);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert_eq!(s.log.level, "debug");
    assert_eq!(s.log.file, Some(std::path::PathBuf::from("/tmp/playdeck.log")));
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
poll_interval_ms = 250
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("PLAYDECK_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("PLAYDECK__PLAYBACK__POLL_INTERVAL_MS", "40");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.poll_interval_ms, 40);
}

#[test]
fn missing_config_file_yields_defaults() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let _g1 = EnvGuard::set("PLAYDECK_CONFIG_PATH", missing.to_str().unwrap());

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.poll_interval_ms, 100);
    assert_eq!(s.library.preset, ExtensionPreset::All);
}
