//! Application module: the view model used by the TUI and runtime.
//!
//! `App` holds the scanned library, the cursors of the two lists and popup
//! flags. Playback state lives in the player, not here.

mod model;

pub use model::*;
