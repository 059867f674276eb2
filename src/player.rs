//! Playback session: the queue, transport state and the glue between the
//! media element, lyrics and the system media bridge.

mod controller;
mod events;
mod queue;
mod remote;
mod session;
mod state;
mod time;

pub use controller::{ControllerOptions, PlayerController, QueueUpdate};
pub use events::PlayerEvent;
pub use queue::{Direction, Queue, QueueError};
pub use remote::RemoteCommand;
pub use session::{
    ARTWORK_SIZES, Artwork, MediaSession, NoSession, PositionState, SessionMetadata, SessionState,
};
pub use state::{PlaybackState, RepeatMode, Transport};
pub use time::format_time;
