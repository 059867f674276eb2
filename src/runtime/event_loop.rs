use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::{App, Focus};
use crate::config;
use crate::media::MediaElement;
use crate::mpris::ControlCmd;
use crate::player::{PlayerController, PlayerEvent};
use crate::presentation::{TitleMirror, window_title};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: folds in player completions, mirrors the title,
/// draws, then handles MPRIS commands and key presses. Returns `Ok(())` when
/// shutdown is requested.
pub fn run<M: MediaElement>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    player: &mut PlayerController<M>,
    control_rx: &mpsc::Receiver<ControlCmd>,
    title: &mut TitleMirror,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        player.pump();
        for event in player.drain_events() {
            match event {
                PlayerEvent::PlaybackFailed(msg) => app.set_status(format!("Playback failed: {msg}")),
                PlayerEvent::QueueChanged | PlayerEvent::Cleared => {
                    app.clamp_queue_selection(player.queue().len())
                }
                PlayerEvent::TrackChanged => app.status_message = None,
                PlayerEvent::PlaybackChanged { playing } => debug!(playing, "playback changed"),
                PlayerEvent::ActiveLyricChanged(line) => debug!(?line, "active lyric line"),
                _ => {}
            }
        }

        if settings.ui.mirror_title {
            let text = window_title(
                player.current_track().map(|t| t.as_ref()),
                player.current_collection(),
                &settings.ui.app_name,
            );
            title.update(terminal.backend_mut(), &text)?;
        }

        terminal.draw(|f| ui::draw(f, app, player, settings))?;

        while let Ok(cmd) = control_rx.try_recv() {
            match cmd.into_remote() {
                Some(remote) => player.handle_remote(remote),
                None => return Ok(()),
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, player, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Apply one key press. Returns `true` when the user asked to quit.
fn handle_key_event<M: MediaElement>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    player: &mut PlayerController<M>,
    state: &mut EventLoopState,
) -> bool {
    let queue_len = player.queue().len();
    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }
    let scrub = settings.playback.scrub_seconds as f64;
    let step = settings.playback.volume_step;

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Char('q') => return true,
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Char('j') | KeyCode::Down => app.next(queue_len),
        KeyCode::Char('k') | KeyCode::Up => app.prev(queue_len),
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.select_first(queue_len);
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.select_last(queue_len),
        KeyCode::Enter => {
            if app.focus == Focus::Library && app.has_tracks() {
                if let Err(e) = player.play_queue(app.tracks.clone(), app.selected, None) {
                    app.set_status(e.to_string());
                }
            }
        }
        KeyCode::Char('a') => {
            if let Some(track) = app.selected_track().cloned() {
                app.set_status(format!("Queued {}", track.label()));
                player.append_to_queue(track);
            }
        }
        KeyCode::Char('d') => {
            if app.focus == Focus::Queue && player.has_queue() {
                match player.remove_from_queue(app.queue_selected) {
                    Ok(track) => app.set_status(format!("Removed {}", track.label())),
                    Err(e) => app.set_status(e.to_string()),
                }
                app.clamp_queue_selection(player.queue().len());
            }
        }
        KeyCode::Char('c') => player.clear_queue(),
        KeyCode::Char(' ') | KeyCode::Char('p') => player.toggle_play(),
        KeyCode::Char('l') => player.next(),
        KeyCode::Char('h') => player.previous(),
        KeyCode::Char('L') => player.seek_by(scrub),
        KeyCode::Char('H') => player.seek_by(-scrub),
        KeyCode::Char('+') | KeyCode::Char('=') => player.set_volume(player.state().volume + step),
        KeyCode::Char('-') => player.set_volume(player.state().volume - step),
        KeyCode::Char('m') => player.toggle_mute(),
        KeyCode::Char('s') => player.toggle_shuffle(),
        KeyCode::Char('r') => player.toggle_repeat(),
        KeyCode::Char('y') => {
            if let Some(track) = player.current_track().cloned() {
                player.search_lyrics(track.display_title(), track.display_artist(), track.album.as_deref());
            }
        }
        KeyCode::Char('K') => app.toggle_metadata_window(),
        other => debug!(?other, "unbound key"),
    }

    false
}
