//! Presentation-side model: `App`.
//!
//! Everything here is local to the terminal UI: the list cursor and the scrub
//! preview. Playback state itself lives in the session and is read from its
//! published snapshot.

use std::sync::Arc;
use std::time::Duration;

use crate::library::Catalog;
use crate::session::{Intent, SessionSnapshot};

/// The main presentation model.
pub struct App {
    pub catalog: Arc<Catalog>,
    pub selected: usize,
    pub follow_playback: bool,
    /// Pending scrub position; `Some` while the user is seeking.
    pub scrub: Option<Duration>,
    pub source_label: Option<String>,
}

impl App {
    /// Create a new `App` over the session's catalog.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            selected: 0,
            follow_playback: true,
            scrub: None,
            source_label: None,
        }
    }

    /// Record what was scanned, for the status line.
    pub fn set_source_label(&mut self, label: String) {
        self.source_label = Some(label);
    }

    /// Return true if the catalog contains any tracks.
    pub fn has_tracks(&self) -> bool {
        !self.catalog.is_empty()
    }

    /// Enable following playback (cursor follows the current track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Move the cursor to the playing track when following playback.
    pub fn sync_with(&mut self, snapshot: &SessionSnapshot) {
        if self.follow_playback {
            if let Some(idx) = snapshot.current_index {
                self.set_selected(idx);
            }
        }
    }

    /// Set the selected index, ignoring out-of-range values.
    pub fn set_selected(&mut self, idx: usize) {
        if idx < self.catalog.len() {
            self.selected = idx;
        }
    }

    /// Move selection to the next track, wrapping to the first.
    pub fn next(&mut self) {
        if self.has_tracks() {
            self.selected = (self.selected + 1) % self.catalog.len();
        }
    }

    /// Move selection to the previous track, wrapping to the last.
    pub fn prev(&mut self) {
        if self.has_tracks() {
            let len = self.catalog.len();
            self.selected = (self.selected + len - 1) % len;
        }
    }

    /// Intent that plays the track under the cursor.
    pub fn play_selected(&mut self) -> Option<Intent> {
        if !self.has_tracks() {
            return None;
        }
        self.follow_playback_on();
        Some(Intent::SelectTrack(self.selected))
    }

    pub fn is_scrubbing(&self) -> bool {
        self.scrub.is_some()
    }

    /// Move the scrub preview by `delta_secs`, starting from the playing
    /// position if no scrub is in progress. The engine is not touched.
    pub fn scrub_by(&mut self, delta_secs: i64, snapshot: &SessionSnapshot) {
        if snapshot.current_index.is_none() {
            return;
        }
        let from = self.scrub.unwrap_or(snapshot.position);
        let delta = Duration::from_secs(delta_secs.unsigned_abs());
        let to = if delta_secs < 0 {
            from.saturating_sub(delta)
        } else {
            from.saturating_add(delta)
        };
        self.scrub = Some(to.min(snapshot.duration));
    }

    /// Finish seeking: returns the seek to send, if a scrub was in progress.
    pub fn commit_scrub(&mut self) -> Option<Intent> {
        self.scrub.take().map(Intent::SeekTo)
    }

    pub fn cancel_scrub(&mut self) {
        self.scrub = None;
    }

    /// Seek to `tenths` / 10 of the current track (0 ⇒ start, 9 ⇒ 90 %).
    pub fn seek_to_tenth(&mut self, tenths: u32, snapshot: &SessionSnapshot) -> Option<Intent> {
        snapshot.current_index?;
        self.scrub = None;
        Some(Intent::SeekTo(snapshot.duration * tenths.min(10) / 10))
    }

    /// Position shown on the scrub bar: the preview while seeking, else playback.
    pub fn shown_position(&self, snapshot: &SessionSnapshot) -> Duration {
        self.scrub.unwrap_or(snapshot.position)
    }
}
