use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{LogSettings, default_log_path};

/// Environment variable holding an `EnvFilter` directive that overrides `log.level`.
pub const LOG_ENV: &str = "PLAYDECK_LOG";

/// Where log lines go: `log.file`, else the XDG state directory.
pub fn log_path(settings: &LogSettings) -> Option<PathBuf> {
    settings.file.clone().or_else(default_log_path)
}

/// Filter from `PLAYDECK_LOG`, else the configured level, else `info`.
pub fn build_filter(settings: &LogSettings) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a file-backed subscriber. The terminal belongs to the UI, so when
/// the log file cannot be opened logging stays off.
pub fn init(settings: &LogSettings) {
    let Some(path) = log_path(settings) else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("playdeck: cannot open log file {}: {e}", path.display());
            return;
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(build_filter(settings))
        .try_init();
}
