//! Client-local preferences that survive restarts. Only the volume for now.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::default_state_dir;

#[derive(Error, Debug)]
pub enum PrefsError {
    #[error("state file io: {0}")]
    Io(#[from] io::Error),
    #[error("state file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot serialize state: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub trait PreferenceStore {
    fn load_volume(&self) -> Option<f64>;
    fn save_volume(&mut self, volume: f64) -> Result<(), PrefsError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    volume: Option<f64>,
}

/// TOML file store, `$XDG_STATE_HOME/sono/state.toml` by default.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `SONO_STATE_PATH`, else `state.toml` in the state directory.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(p) = std::env::var_os("SONO_STATE_PATH") {
            return Some(PathBuf::from(p));
        }
        default_state_dir().map(|d| d.join("state.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoredState, PrefsError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(toml::from_str(&text)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(StoredState::default()),
            Err(e) => Err(e.into()),
        }
    }
}

impl PreferenceStore for FileStore {
    fn load_volume(&self) -> Option<f64> {
        match self.read() {
            Ok(state) => state.volume.filter(|v| v.is_finite() && (0.0..=1.0).contains(v)),
            Err(e) => {
                warn!(path = %self.path.display(), "ignoring saved state: {e}");
                None
            }
        }
    }

    fn save_volume(&mut self, volume: f64) -> Result<(), PrefsError> {
        // Keep whatever else is in the file if it still parses.
        let mut state = self.read().unwrap_or_default();
        state.volume = Some(volume);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string(&state)?)?;
        Ok(())
    }
}

/// Keeps preferences for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    volume: Option<f64>,
}

impl PreferenceStore for MemoryStore {
    fn load_volume(&self) -> Option<f64> {
        self.volume
    }

    fn save_volume(&mut self, volume: f64) -> Result<(), PrefsError> {
        self.volume = Some(volume);
        Ok(())
    }
}
