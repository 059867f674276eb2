//! Observable playback values.

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RepeatMode {
    /// Stop at either end of the queue.
    #[default]
    Off,
    /// Wrap around at either end of the queue.
    All,
    /// Restart the current track when it ends.
    One,
}

impl RepeatMode {
    /// Off → All → One → Off.
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RepeatMode::Off => "off",
            RepeatMode::All => "all",
            RepeatMode::One => "one",
        }
    }
}

/// Coarse transport phase derived from [`PlaybackState`] and the current track.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transport {
    Idle,
    Loading,
    Playing,
    Paused,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Mirrors what the media element reported, not what was requested.
    pub is_playing: bool,
    /// Seconds.
    pub position: f64,
    /// Seconds; 0 while unknown.
    pub duration: f64,
    /// 0.0 ..= 1.0
    pub volume: f64,
    pub is_muted: bool,
    pub is_loading: bool,
    pub repeat_mode: RepeatMode,
    pub is_shuffled: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            position: 0.0,
            duration: 0.0,
            volume: 1.0,
            is_muted: false,
            is_loading: false,
            repeat_mode: RepeatMode::Off,
            is_shuffled: false,
        }
    }
}
