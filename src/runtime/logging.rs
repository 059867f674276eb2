use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{LoggingSettings, default_state_dir};

/// Log file used when `logging.file` is not set.
pub fn default_log_path() -> Option<PathBuf> {
    default_state_dir().map(|d| d.join("sono.log"))
}

/// Send `tracing` output to a file; the terminal belongs to the TUI.
///
/// `SONO_LOG` takes precedence over `logging.level`. When the file cannot be
/// opened logging stays off.
pub fn init(settings: &LoggingSettings) {
    let Some(path) = settings.file.clone().or_else(default_log_path) else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_env("SONO_LOG")
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
