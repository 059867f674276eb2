use super::load::{default_config_path, default_state_dir, resolve_config_path};
use super::schema::*;
use crate::player::RepeatMode;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_sono_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("SONO_CONFIG_PATH", "/tmp/sono-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/sono-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    assert_eq!(
        default_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("sono")
            .join("config.toml")
    );
}

#[test]
fn default_paths_fall_back_to_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::remove("XDG_STATE_HOME");
    let _g3 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.config/sono/config.toml")
    );
    assert_eq!(
        default_state_dir().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/state/sono")
    );
}

#[test]
fn settings_load_from_config_file_and_parse_repeat_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
shuffle = true
repeat_mode = "repeat-one"
restart_threshold_secs = 4.5
scrub_seconds = 9

[lyrics]
enabled = false
endpoint = "http://localhost:9999/api"

[mpris]
identity = "test-player"

[ui]
app_name = "Test"
mirror_title = false

[library]
extensions = ["mp3"]
recursive = false

[logging]
level = "debug"
file = "/tmp/sono-test.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SONO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("SONO__PLAYBACK__SCRUB_SECONDS");

    let s = Settings::load().unwrap();
    assert!(s.playback.shuffle);
    assert_eq!(s.playback.repeat_mode, RepeatModeSetting::One);
    assert_eq!(RepeatMode::from(s.playback.repeat_mode), RepeatMode::One);
    assert_eq!(s.playback.restart_threshold_secs, 4.5);
    assert_eq!(s.playback.scrub_seconds, 9);
    // untouched keys keep their defaults
    assert_eq!(s.playback.restart_threshold_secs, 3.0);
    assert!(!s.lyrics.enabled);
    assert_eq!(s.lyrics.endpoint, "http://localhost:9999/api");
    assert_eq!(s.mpris.identity, "test-player");
    assert_eq!(s.mpris.bus_name, "org.mpris.MediaPlayer2.sono");
    assert_eq!(s.ui.app_name, "Test");
    assert!(!s.ui.mirror_title);
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert_eq!(s.logging.level, "debug");
    assert_eq!(
        s.logging.file.as_deref(),
        Some(std::path::Path::new("/tmp/sono-test.log"))
    );
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
scrub_seconds = 30
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SONO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("SONO__PLAYBACK__SCRUB_SECONDS", "2");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.scrub_seconds, 2);
}

#[test]
fn validate_rejects_nonsense_values() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.playback.restart_threshold_secs = -1.0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.playback.volume_step = 0.0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.lyrics.endpoint = "  ".into();
    assert!(s.validate().is_err());
    s.lyrics.enabled = false;
    assert!(s.validate().is_ok());
}
