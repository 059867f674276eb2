/// A transport command from the system media control surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RemoteCommand {
    Play,
    Pause,
    PlayPause,
    Next,
    Previous,
    /// Absolute position in seconds.
    SeekTo(f64),
    /// Relative offset in seconds, negative to go back.
    SeekBy(f64),
}
