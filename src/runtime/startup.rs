use std::sync::mpsc::Sender;

use tracing::{info, warn};

use crate::config::{LyricsSettings, Settings};
use crate::lyrics::{LrcLibClient, LyricsFetch, LyricsWorker};
use crate::media::{LocalElement, MediaError};
use crate::mpris::{ControlCmd, spawn_mpris};
use crate::player::{ControllerOptions, MediaSession, NoSession, PlayerController};
use crate::prefs::{FileStore, MemoryStore, PreferenceStore};

/// Wire the player to the audio device, MPRIS, the state file and lyrics.
pub fn build_player(
    settings: &Settings,
    control_tx: Sender<ControlCmd>,
) -> Result<PlayerController<LocalElement>, MediaError> {
    let media = LocalElement::open()?;

    let session: Box<dyn MediaSession> = if settings.mpris.enabled {
        Box::new(spawn_mpris(control_tx, &settings.mpris))
    } else {
        Box::new(NoSession)
    };

    let prefs: Box<dyn PreferenceStore> = match FileStore::default_path() {
        Some(path) => {
            let store = FileStore::new(path);
            info!(path = %store.path().display(), "state file");
            Box::new(store)
        }
        None => {
            warn!("no state directory; volume will not be remembered");
            Box::new(MemoryStore::default())
        }
    };

    Ok(PlayerController::new(
        media,
        ControllerOptions::from(&settings.playback),
        session,
        prefs,
        lyrics_worker(&settings.lyrics),
    ))
}

fn lyrics_worker(settings: &LyricsSettings) -> Option<Box<dyn LyricsFetch>> {
    if !settings.enabled {
        return None;
    }
    match LrcLibClient::new(settings) {
        Ok(client) => Some(Box::new(LyricsWorker::spawn(client))),
        Err(e) => {
            warn!("lyrics disabled: {e}");
            None
        }
    }
}
