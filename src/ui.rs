//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, Focus};
use crate::config::Settings;
use crate::library::Track;
use crate::lyrics::Lyrics;
use crate::media::MediaElement;
use crate::player::{PlayerController, RepeatMode, Transport, format_time};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("gg/G".to_string(), "top/bottom".to_string());
    map.insert("tab".to_string(), "library/queue".to_string());
    map.insert("enter".to_string(), "play from here".to_string());
    map.insert("a".to_string(), "append".to_string());
    map.insert("d".to_string(), "remove".to_string());
    map.insert("c".to_string(), "clear queue".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next song".to_string());
    // H/L is filled dynamically from config.
    map.insert("+/-".to_string(), "volume".to_string());
    map.insert("m".to_string(), "mute".to_string());
    map.insert("s".to_string(), "shuffle".to_string());
    map.insert("r".to_string(), "repeat".to_string());
    map.insert("y".to_string(), "find lyrics".to_string());
    map.insert("K".to_string(), "metadata".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "tab", "enter", "space/p", "h/l", "H/L", "+/-", "m", "s", "r", "a", "d", "c", "y",
        "gg/G", "K", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Window `[start, end)` of `total` rows that fits `height` and keeps
/// `selected` centered when possible. Returns the selection's row within
/// the window as well.
pub(crate) fn visible_window(total: usize, selected: usize, height: usize) -> (usize, usize, usize) {
    let selected = selected.min(total.saturating_sub(1));
    if total <= height || height == 0 {
        return (0, total, selected);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, selected - start)
}

fn repeat_text(mode: RepeatMode) -> &'static str {
    match mode {
        RepeatMode::Off => "REPEAT: Off",
        RepeatMode::All => "REPEAT: All",
        RepeatMode::One => "REPEAT: One",
    }
}

/// Status line parts: transport, time, repeat, shuffle, volume, directory.
pub(crate) fn status_text<M: MediaElement>(app: &App, player: &PlayerController<M>) -> String {
    let state = player.state();
    let mut parts: Vec<String> = Vec::new();

    let transport = match player.transport() {
        Transport::Idle => "Stopped",
        Transport::Loading => "Loading",
        Transport::Playing => "Playing",
        Transport::Paused => "Paused",
    };
    parts.push(format!(" {transport}"));

    if player.has_track() {
        parts.push(format!(
            "{} / {}",
            format_time(state.position),
            format_time(state.duration)
        ));
    }

    parts.push(repeat_text(state.repeat_mode).to_string());
    parts.push(if state.is_shuffled { "SHUFFLE: On" } else { "SHUFFLE: Off" }.to_string());

    if state.is_muted {
        parts.push("VOL: muted".to_string());
    } else {
        parts.push(format!("VOL: {:.0}%", state.volume * 100.0));
    }

    if let Some(dir) = &app.current_dir {
        parts.push(format!("Dir: {}", dir));
    }
    if let Some(msg) = &app.status_message {
        parts.push(msg.clone());
    }

    parts.join(" • ")
}

fn now_playing_text<M: MediaElement>(player: &PlayerController<M>) -> String {
    match player.current_track() {
        Some(t) => {
            let artist = crate::library::context_artist(t, player.current_collection());
            format!("{} - {}", t.display_title(), artist)
        }
        None => "Nothing playing".to_string(),
    }
}

fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn focus_block(title: &str, focused: bool) -> Block<'_> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(Style::default().add_modifier(Modifier::BOLD))
    } else {
        block
    }
}

fn track_list<'a>(
    tracks: &'a [std::sync::Arc<Track>],
    selected: usize,
    playing: Option<usize>,
    height: usize,
    block: Block<'a>,
) -> (List<'a>, ListState) {
    let (start, end, selected_in_window) = visible_window(tracks.len(), selected, height);
    let items: Vec<ListItem> = tracks[start..end]
        .iter()
        .enumerate()
        .map(|(offset, t)| {
            let marker = if playing == Some(start + offset) { "♪ " } else { "  " };
            ListItem::new(format!("{marker}{}", t.label()))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !tracks.is_empty() {
        state.select(Some(selected_in_window));
    }
    (list, state)
}

fn lyrics_title(lyrics: Option<&Lyrics>) -> &'static str {
    match lyrics {
        Some(l) if l.is_synced() => " lyrics (synced) ",
        _ => " lyrics ",
    }
}

fn queue_title(len: usize) -> String {
    if len == 0 {
        " queue (empty) ".to_string()
    } else {
        format!(" queue ({len}) ")
    }
}

fn lyrics_paragraph<'a, M: MediaElement>(player: &PlayerController<M>, height: usize) -> Paragraph<'a> {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(lyrics_title(player.lyrics()))
        .padding(Padding {
            left: 1,
            right: 1,
            top: 0,
            bottom: 0,
        });

    let Some(lyrics) = player.lyrics() else {
        let text = if player.lyrics_loading() {
            "Searching lyrics..."
        } else if player.has_track() {
            "No lyrics"
        } else {
            ""
        };
        return Paragraph::new(text).alignment(Alignment::Center).block(block);
    };

    let active = player.active_lyric();
    let (start, end, _) = visible_window(lyrics.line_count(), active.unwrap_or(0), height);
    let lines: Vec<Line> = (start..end)
        .map(|i| {
            let text = lyrics.line_text(i).unwrap_or_default().to_string();
            if active == Some(i) {
                Line::styled(text, Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
            } else {
                Line::from(text)
            }
        })
        .collect();

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block)
        .wrap(Wrap { trim: true })
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw<M: MediaElement>(
    frame: &mut Frame,
    app: &App,
    player: &PlayerController<M>,
    settings: &Settings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header: now playing
    let header = Paragraph::new(now_playing_text(player))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", settings.ui.app_name))
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status_par = Paragraph::new(status_text(app, player))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(columns[1]);

    // Library
    {
        let playing_id = player.current_track().map(|t| t.id.as_str());
        let playing = playing_id.and_then(|id| app.tracks.iter().position(|t| t.id == id));
        let height = columns[0].height.saturating_sub(2) as usize;
        let (list, mut state) = track_list(
            &app.tracks,
            app.selected,
            playing,
            height,
            focus_block(" library ", app.focus == Focus::Library),
        );
        frame.render_stateful_widget(list, columns[0], &mut state);
    }

    // Queue
    {
        let queue = player.queue();
        let height = right[0].height.saturating_sub(2) as usize;
        let title = queue_title(queue.len());
        let (list, mut state) = track_list(
            queue.items(),
            app.queue_selected,
            queue.current_index(),
            height,
            focus_block(&title, app.focus == Focus::Queue),
        );
        frame.render_stateful_widget(list, right[0], &mut state);
    }

    let lyrics_height = right[1].height.saturating_sub(2) as usize;
    frame.render_widget(lyrics_paragraph(player, lyrics_height), right[1]);

    // Overlay metadata popup (keeps list visible under it)
    if app.metadata_window {
        let popup_area = centered_rect_sized(72, 9, columns[0]);
        frame.render_widget(Clear, popup_area);

        let meta = if let Some(track) = app.selected_track() {
            format!(
                "Title: {}\nArtist: {}\nAlbum: {}\nDuration: {}\nPath: {}",
                track.display_title(),
                track.display_artist(),
                track.album.as_deref().unwrap_or("-"),
                track.duration.map(format_time).unwrap_or_else(|| "-".to_string()),
                track.id
            )
        } else {
            "No track selected".to_string()
        };
        let meta_paragraph = Paragraph::new(meta)
            .block(
                Block::default()
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 0,
                        bottom: 0,
                    })
                    .borders(Borders::ALL)
                    .title(" metadata (K closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(meta_paragraph, popup_area);
    }

    let footer = Paragraph::new(controls_text(settings.playback.scrub_seconds))
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
    use crate::lyrics::TimedLine;

    #[test]
    fn window_covers_everything_when_it_fits() {
        assert_eq!(visible_window(5, 3, 10), (0, 5, 3));
        assert_eq!(visible_window(0, 0, 10), (0, 0, 0));
    }

    #[test]
    fn window_centers_selection() {
        assert_eq!(visible_window(100, 50, 10), (45, 55, 5));
    }

    #[test]
    fn window_sticks_to_the_ends() {
        assert_eq!(visible_window(100, 2, 10), (0, 10, 2));
        assert_eq!(visible_window(100, 99, 10), (90, 100, 9));
    }

    #[test]
    fn lyrics_title_marks_synced_lyrics() {
        let synced = Lyrics::Synced {
            lines: vec![TimedLine {
                time: 1.0,
                text: "la".to_string(),
            }],
            raw: "[00:01.00]la".to_string(),
            plain: None,
        };
        let plain = Lyrics::Plain {
            lines: vec!["la".to_string()],
            plain: "la".to_string(),
        };
        assert_eq!(lyrics_title(Some(&synced)), " lyrics (synced) ");
        assert_eq!(lyrics_title(Some(&plain)), " lyrics ");
        assert_eq!(lyrics_title(None), " lyrics ");
    }

    #[test]
    fn queue_title_shows_count_or_empty() {
        assert_eq!(queue_title(0), " queue (empty) ");
        assert_eq!(queue_title(3), " queue (3) ");
    }

    #[test]
    fn controls_text_includes_scrub_seconds() {
        let text = controls_text(7);
        assert!(text.contains("[H/L] scrub -/+7s"));
        assert!(text.contains("[space/p] play/pause"));
        assert!(text.contains("[y] find lyrics"));
    }
}
