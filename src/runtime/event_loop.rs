use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, warn};

use crate::app::App;
use crate::config;
use crate::session::{Intent, SessionHandle, SessionSnapshot};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// What a key press asks the runtime to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Send(Intent),
    Quit,
}

/// Main terminal event loop: handles input, UI drawing and forwarding intents
/// to the session. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    session: &SessionHandle,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Sync from the session; optionally follow now-playing.
        let snapshot = session.snapshot();
        app.sync_with(&snapshot);

        terminal.draw(|f| ui::draw(f, app, &snapshot, &settings.ui, &settings.controls))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match handle_key_event(key, settings, app, &snapshot, state) {
                    KeyAction::None => {}
                    KeyAction::Send(intent) => {
                        debug!(?intent, "forwarding intent");
                        if let Err(err) = session.send(intent) {
                            warn!(%err, "session thread is gone, leaving the UI");
                            break;
                        }
                    }
                    KeyAction::Quit => break,
                }
            }
        }
    }

    Ok(())
}

/// Map one key press to UI-local changes and, possibly, a session intent.
pub fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    snapshot: &SessionSnapshot,
    state: &mut EventLoopState,
) -> KeyAction {
    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.follow_playback_off();
                app.set_selected(0);
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            app.follow_playback_off();
            app.set_selected(app.catalog.len().saturating_sub(1));
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.follow_playback_off();
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.follow_playback_off();
            app.prev();
        }
        KeyCode::Enter => {
            // A pending scrub takes priority over list selection.
            if let Some(intent) = app.commit_scrub() {
                return KeyAction::Send(intent);
            }
            if let Some(intent) = app.play_selected() {
                return KeyAction::Send(intent);
            }
        }
        KeyCode::Esc => app.cancel_scrub(),
        KeyCode::Char('L') => {
            let secs = settings.controls.scrub_seconds.min(i64::MAX as u64) as i64;
            app.scrub_by(secs, snapshot);
        }
        KeyCode::Char('H') => {
            let secs = settings.controls.scrub_seconds.min(i64::MAX as u64) as i64;
            app.scrub_by(-secs, snapshot);
        }
        KeyCode::Char(c @ '0'..='9') => {
            let tenths = c.to_digit(10).unwrap_or(0);
            if let Some(intent) = app.seek_to_tenth(tenths, snapshot) {
                return KeyAction::Send(intent);
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            app.follow_playback_on();
            return KeyAction::Send(Intent::PlayPause);
        }
        KeyCode::Char('l') => {
            app.cancel_scrub();
            app.follow_playback_on();
            return KeyAction::Send(Intent::Next);
        }
        KeyCode::Char('h') => {
            app.cancel_scrub();
            app.follow_playback_on();
            return KeyAction::Send(Intent::Previous);
        }
        KeyCode::Char('m') | KeyCode::Char('r') => {
            app.cancel_scrub();
            return KeyAction::Send(Intent::ToggleMode);
        }
        _ => {}
    }

    KeyAction::None
}
