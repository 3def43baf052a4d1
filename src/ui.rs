//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`. Cover art
//! is drawn with half-block characters: each cell shows two vertically stacked
//! pixels, the upper one as foreground and the lower one as background.

use image::{Rgba, RgbaImage, imageops::FilterType};
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    widgets::{Block, Borders, Gauge, List, ListItem, Padding, Paragraph, Widget, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::App;
use crate::config::{ControlsSettings, UiSettings};
use crate::library::CoverArt;
use crate::session::{PlaybackMode, SessionPhase, SessionSnapshot};

const COVER_WIDTH: u16 = 26;
const NOW_PLAYING_HEIGHT: u16 = 13;

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("enter".to_string(), "play selected".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next song".to_string());
    // H/L is filled dynamically from config.
    map.insert("0-9".to_string(), "jump 0-90%".to_string());
    map.insert("esc".to_string(), "cancel seek".to_string());
    map.insert("m/r".to_string(), "play mode".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Built-in cover shown when a track has no usable embedded picture.
static DEFAULT_COVER: LazyLock<RgbaImage> = LazyLock::new(|| {
    const EDGE: u32 = 32;
    RgbaImage::from_fn(EDGE, EDGE, |x, y| {
        let ring = (x as i32 - 15).abs().max((y as i32 - 15).abs());
        let shade = if ring % 4 == 0 { 90 } else { 40 + (x + y) as u8 };
        Rgba([shade, shade, shade.saturating_add(20), 255])
    })
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "enter", "space/p", "h/l", "H/L", "esc", "0-9", "m/r", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] seek -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn phase_text(phase: SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Idle => "Idle",
        SessionPhase::Paused => "Paused",
        SessionPhase::Playing => "Playing",
        SessionPhase::Unplayable => "Unplayable",
    }
}

fn mode_text(mode: PlaybackMode) -> &'static str {
    match mode {
        PlaybackMode::PlayAll => "MODE: Play all",
        PlaybackMode::RepeatOne => "MODE: Repeat one",
    }
}

/// Largest size with the source's aspect ratio that fits in `max_w` x `max_h`.
fn fit_within(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if src_w == 0 || src_h == 0 || max_w == 0 || max_h == 0 {
        return (0, 0);
    }
    let by_width = (max_w, (src_h as u64 * max_w as u64 / src_w as u64) as u32);
    let (w, h) = if by_width.1 <= max_h {
        by_width
    } else {
        ((src_w as u64 * max_h as u64 / src_h as u64) as u32, max_h)
    };
    (w.max(1), h.max(1))
}

/// Half-block picture widget.
struct CoverWidget<'a> {
    image: &'a RgbaImage,
}

impl Widget for CoverWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (w, h) = fit_within(
            self.image.width(),
            self.image.height(),
            area.width as u32,
            area.height as u32 * 2,
        );
        if w == 0 || h == 0 {
            return;
        }
        let scaled = image::imageops::resize(self.image, w, h, FilterType::Triangle);

        let cols = w as u16;
        let rows = h.div_ceil(2) as u16;
        let x0 = area.x + (area.width.saturating_sub(cols)) / 2;
        let y0 = area.y + (area.height.saturating_sub(rows)) / 2;

        for row in 0..rows {
            for col in 0..cols {
                let top = scaled.get_pixel(col as u32, row as u32 * 2);
                let bottom = scaled
                    .get_pixel_checked(col as u32, row as u32 * 2 + 1)
                    .copied()
                    .unwrap_or(Rgba([0, 0, 0, 0]));
                if let Some(cell) = buf.cell_mut((x0 + col, y0 + row)) {
                    cell.set_char('▀')
                        .set_fg(to_color(*top))
                        .set_bg(to_color(bottom));
                }
            }
        }
    }
}

fn to_color(px: Rgba<u8>) -> Color {
    if px[3] == 0 {
        return Color::Reset;
    }
    Color::Rgb(px[0], px[1], px[2])
}

fn draw_cover(frame: &mut Frame, area: Rect, cover: &CoverArt) {
    let title = if cover.is_default() {
        " no cover "
    } else {
        " cover "
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let image = match cover {
        CoverArt::Embedded(art) => &art.image,
        CoverArt::Default => &*DEFAULT_COVER,
    };
    frame.render_widget(CoverWidget { image }, inner);
}

fn status_text(app: &App, snapshot: &SessionSnapshot) -> String {
    let mut parts: Vec<String> = Vec::new();

    if app.is_scrubbing() {
        parts.push(" Seeking".to_string());
    } else {
        parts.push(format!(" {}", phase_text(snapshot.phase)));
    }

    parts.push(mode_text(snapshot.mode).to_string());

    if let Some(idx) = snapshot.current_index {
        parts.push(format!("Track {}/{}", idx + 1, snapshot.catalog_size));
    }

    if app.follow_playback {
        parts.push("CURSOR: Follow".to_string());
    } else {
        parts.push("CURSOR: Free-roam".to_string());
    }

    if let Some(src) = &app.source_label {
        parts.push(format!("Source: {}", src));
    }

    parts.join(" • ")
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    snapshot: &SessionSnapshot,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let list_constraint = if ui_settings.show_track_list {
        Constraint::Min(3)
    } else {
        Constraint::Length(0)
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(NOW_PLAYING_HEIGHT),
            list_constraint,
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" playdeck ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Now playing: cover on the left, title/progress/status on the right.
    let now = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(COVER_WIDTH), Constraint::Min(10)])
        .split(chunks[1]);
    draw_cover(frame, now[0], &snapshot.cover);

    let info = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(now[1]);

    let title = if snapshot.catalog_size == 0 {
        "No playable files found".to_string()
    } else {
        snapshot.title.clone()
    };
    let title_par = Paragraph::new(title)
        .bold()
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" now playing "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(title_par, info[0]);

    let shown = app.shown_position(snapshot).min(snapshot.duration);
    let ratio = if snapshot.duration.is_zero() {
        0.0
    } else {
        (shown.as_secs_f64() / snapshot.duration.as_secs_f64()).clamp(0.0, 1.0)
    };
    let gauge_style = if app.is_scrubbing() {
        Style::default().add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK)
    } else {
        Style::default()
    };
    let gauge = Gauge::default()
        .block(Block::bordered().title(" progress "))
        .gauge_style(gauge_style)
        .ratio(ratio)
        .label(format!(
            "{} / {}",
            format_mmss(shown),
            format_mmss(snapshot.duration)
        ));
    frame.render_widget(gauge, info[1]);

    let status_par = Paragraph::new(status_text(app, snapshot))
        .block(Block::bordered().title(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, info[2]);

    // Track list
    if ui_settings.show_track_list {
        // Center the selected item when possible by creating a visible window.
        // Only build ListItems for the visible window.
        let total = app.catalog.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let sel_pos = app.selected.min(total.saturating_sub(1));
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = (start..end)
            .filter_map(|i| app.catalog.get(i).map(|t| (i, t)))
            .map(|(i, track)| {
                let name = track.stem().unwrap_or(&track.file_name);
                if snapshot.current_index == Some(i) {
                    ListItem::new(format!("♪ {}", name)).bold()
                } else {
                    ListItem::new(format!("  {}", name))
                }
            })
            .collect();

        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(" tracks "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    let footer_text = controls_text(controls_settings.scrub_seconds);
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{Artwork, Catalog, Track};
    use ratatui::{Terminal, backend::TestBackend};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn render(app: &App, snapshot: &SessionSnapshot) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();
        terminal
            .draw(|f| {
                draw(
                    f,
                    app,
                    snapshot,
                    &UiSettings::default(),
                    &ControlsSettings::default(),
                )
            })
            .unwrap();
        terminal
    }

    #[test]
    fn mmss_formats_minutes_and_seconds() {
        assert_eq!(format_mmss(Duration::ZERO), "00:00");
        assert_eq!(format_mmss(Duration::from_millis(61_900)), "01:01");
        assert_eq!(format_mmss(Duration::from_secs(600)), "10:00");
    }

    #[test]
    fn fit_keeps_aspect_ratio() {
        assert_eq!(fit_within(100, 100, 20, 40), (20, 20));
        assert_eq!(fit_within(200, 100, 20, 40), (20, 10));
        assert_eq!(fit_within(100, 400, 20, 40), (10, 40));
        assert_eq!(fit_within(0, 10, 20, 40), (0, 0));
    }

    #[test]
    fn controls_mention_configured_scrub_step() {
        let text = controls_text(7);
        assert!(text.contains("[H/L] seek -/+7s"));
        assert!(text.contains("[q] quit"));
    }

    #[test]
    fn screen_shows_title_time_and_state() {
        let catalog = Catalog::new(vec![
            Track::new(PathBuf::from("/m/first.mp3")),
            Track::new(PathBuf::from("/m/second.mp3")),
        ]);
        let app = App::new(Arc::new(catalog));
        let snapshot = SessionSnapshot {
            title: "Song Title".to_string(),
            phase: SessionPhase::Playing,
            is_playing: true,
            position: Duration::from_secs(65),
            duration: Duration::from_secs(200),
            catalog_size: 2,
            current_index: Some(1),
            ..SessionSnapshot::default()
        };

        let text = screen_text(&render(&app, &snapshot));
        assert!(text.contains("Song Title"));
        assert!(text.contains("01:05 / 03:20"));
        assert!(text.contains("Playing"));
        assert!(text.contains("Track 2/2"));
        assert!(text.contains("second"));
    }

    #[test]
    fn empty_catalog_shows_placeholder() {
        let app = App::new(Arc::new(Catalog::default()));
        let text = screen_text(&render(&app, &SessionSnapshot::default()));
        assert!(text.contains("No playable files found"));
        assert!(text.contains("no cover"));
        assert!(text.contains("Idle"));
    }

    #[test]
    fn scrubbing_shows_preview_position() {
        let app_catalog = Catalog::new(vec![Track::new(PathBuf::from("/m/a.mp3"))]);
        let mut app = App::new(Arc::new(app_catalog));
        let snapshot = SessionSnapshot {
            phase: SessionPhase::Playing,
            position: Duration::from_secs(10),
            duration: Duration::from_secs(100),
            catalog_size: 1,
            current_index: Some(0),
            ..SessionSnapshot::default()
        };
        app.scrub_by(30, &snapshot);

        let text = screen_text(&render(&app, &snapshot));
        assert!(text.contains("Seeking"));
        assert!(text.contains("00:40 / 01:40"));
    }

    #[test]
    fn embedded_cover_paints_half_blocks() {
        let art = Artwork {
            image: RgbaImage::from_pixel(8, 8, Rgba([200, 10, 10, 255])),
        };
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        CoverWidget { image: &art.image }.render(area, &mut buf);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(200, 10, 10));
    }
}
