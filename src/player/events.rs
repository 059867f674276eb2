/// Change notifications for whoever renders the player.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    TrackChanged,
    QueueChanged,
    PlaybackChanged { playing: bool },
    PositionChanged,
    DurationChanged,
    VolumeChanged,
    RepeatChanged,
    ShuffleChanged,
    LyricsChanged,
    ActiveLyricChanged(Option<usize>),
    /// Starting playback failed; the message is for the log/status line.
    PlaybackFailed(String),
    Cleared,
}
