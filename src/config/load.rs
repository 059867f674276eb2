use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `SONO__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("SONO")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        let p = &self.playback;
        if !p.restart_threshold_secs.is_finite() || p.restart_threshold_secs < 0.0 {
            return Err("playback.restart_threshold_secs must be a non-negative number".to_string());
        }
        if !(p.volume_step > 0.0 && p.volume_step <= 1.0) {
            return Err("playback.volume_step must be in (0, 1]".to_string());
        }
        if self.lyrics.enabled && self.lyrics.endpoint.trim().is_empty() {
            return Err("lyrics.endpoint must not be empty when lyrics are enabled".to_string());
        }
        if self.lyrics.timeout_secs == 0 {
            return Err("lyrics.timeout_secs must be >= 1".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `SONO_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("SONO_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/sono/config.toml`
/// or `~/.config/sono/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("sono").join("config.toml"))
}

/// Directory for state that should survive restarts (volume, log file):
/// `$XDG_STATE_HOME/sono` or `~/.local/state/sono`.
pub fn default_state_dir() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join("sono"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
