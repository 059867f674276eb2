//! Lyrics: LRC parsing, active-line resolution and background lookup.
//!
//! Lookups are best effort. "No lyrics" is a normal outcome, and failures are
//! logged by the caller without surfacing to the user.

mod lrclib;
mod parse;
mod types;
mod worker;

pub use lrclib::LrcLibClient;
pub use parse::{parse_timed_lyrics, resolve_active_line};
pub use types::*;
pub use worker::{LyricsFetch, LyricsWorker};

#[cfg(test)]
mod tests;
