use std::path::PathBuf;

use serde::Deserialize;

use crate::player::RepeatMode;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/sono/config.toml` or `~/.config/sono/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SONO__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub lyrics: LyricsSettings,
    pub mpris: MprisSettings,
    pub library: LibrarySettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Repeat mode at startup.
    pub repeat_mode: RepeatModeSetting,
    /// Whether the first queue started is shuffled.
    pub shuffle: bool,
    /// `previous` restarts the current track once more than this many
    /// seconds have elapsed.
    pub restart_threshold_secs: f64,
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Volume change per `+` / `-` key press.
    pub volume_step: f64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            repeat_mode: RepeatModeSetting::Off,
            shuffle: false,
            restart_threshold_secs: 3.0,
            scrub_seconds: 5,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatModeSetting {
    #[serde(alias = "no_loop", alias = "no-loop", alias = "none")]
    Off,
    #[serde(alias = "loop_all", alias = "loop-all", alias = "loop-around")]
    All,
    #[serde(alias = "loop_one", alias = "loop-one", alias = "repeat-one")]
    One,
}

impl From<RepeatModeSetting> for RepeatMode {
    fn from(s: RepeatModeSetting) -> Self {
        match s {
            RepeatModeSetting::Off => RepeatMode::Off,
            RepeatModeSetting::All => RepeatMode::All,
            RepeatModeSetting::One => RepeatMode::One,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LyricsSettings {
    /// Look up lyrics for every track that starts playing.
    pub enabled: bool,
    /// Base URL of the lrclib-compatible API.
    pub endpoint: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for LyricsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://lrclib.net/api".to_string(),
            timeout_secs: 10,
            user_agent: concat!("sono/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MprisSettings {
    pub enabled: bool,
    /// Well-known name requested on the session bus.
    pub bus_name: String,
    /// Human readable player name reported to MPRIS clients.
    pub identity: String,
}

impl Default for MprisSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            bus_name: "org.mpris.MediaPlayer2.sono".to_string(),
            identity: "sono".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Application name used in the header and the window title.
    pub app_name: String,
    /// Mirror the now-playing track into the terminal window title.
    pub mirror_title: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            app_name: "Sono".to_string(),
            mirror_title: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default `tracing` filter; `SONO_LOG` takes precedence.
    pub level: String,
    /// Log file. Defaults to `sono.log` in the state directory.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
