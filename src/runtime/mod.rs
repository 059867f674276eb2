use std::env;
use std::path::Path;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::library::scan;
use crate::mpris::ControlCmd;
use crate::presentation::TitleMirror;

mod event_loop;
mod logging;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_warning) = settings::load_settings();
    logging::init(&settings.logging);
    if let Some(msg) = settings_warning {
        warn!("{msg}");
    }

    let dir = env::args().nth(1).unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| "Music".to_string())
    });

    let tracks = scan(Path::new(&dir), &settings.library);
    info!(%dir, tracks = tracks.len(), "library scanned");
    let mut app = App::new(tracks);
    app.set_current_dir(dir.clone());

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mut player = startup::build_player(&settings, control_tx)?;

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut title = TitleMirror::new();

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &mut player,
            &control_rx,
            &mut title,
            &mut state,
        )
    })();

    if settings.ui.mirror_title {
        let _ = title.update(terminal.backend_mut(), &settings.ui.app_name);
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
