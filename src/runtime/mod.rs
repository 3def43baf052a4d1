use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info};

use crate::app::App;
use crate::audio::RodioEngine;
use crate::config;
use crate::library::{Catalog, LoftyMetadata, ScanSource, scan};
use crate::session::{SessionHandle, SessionOptions};

mod event_loop;
mod logging;
mod settings;

/// Pick what to scan: the CLI argument, then `library.root`, then the
/// current directory.
fn resolve_source(arg: Option<String>, settings: &config::Settings) -> ScanSource {
    let path = arg
        .map(PathBuf::from)
        .or_else(|| settings.library.root.clone())
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    ScanSource::from_path(&path)
}

fn session_options(settings: &config::Settings) -> SessionOptions {
    SessionOptions {
        mode: settings.playback.mode.into(),
        poll_interval: Duration::from_millis(settings.playback.poll_interval_ms.max(1)),
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    logging::init(&settings.log);

    let source = resolve_source(env::args().nth(1), &settings);
    let catalog = Arc::new(Catalog::new(scan(&source, &settings.library)));
    info!(source = %source.path().display(), tracks = catalog.len(), "catalog ready");

    let metadata = Arc::new(LoftyMetadata::new(settings.library.max_artwork_bytes));
    let session = SessionHandle::spawn(
        catalog.clone(),
        RodioEngine::open_default,
        metadata,
        session_options(&settings),
    )
    .inspect_err(|e| error!(%e, "cannot start playback session"))?;

    let mut app = App::new(catalog);
    app.set_source_label(source.path().display().to_string());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        event_loop::run(&mut terminal, &settings, &mut app, &session, &mut state)
    })();

    session.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("exiting");
    run_result
}
