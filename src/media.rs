//! The media element: the thing that actually makes sound.
//!
//! The player drives an element through [`MediaElement`] and learns about
//! what happened by polling [`MediaEvent`]s. Every event carries the load
//! generation it belongs to so late events from a previous source can be
//! told apart.

use thiserror::Error;

mod local;

pub use local::LocalElement;

#[derive(Debug, Clone, PartialEq)]
pub enum MediaEventKind {
    /// The source is decoded far enough to know its length.
    LoadedMetadata { duration: Option<f64> },
    TimeUpdate { position: f64 },
    Play,
    Pause,
    Ended,
    VolumeChange { volume: f64, muted: bool },
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaEvent {
    pub load_id: u64,
    pub kind: MediaEventKind,
}

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("audio output unavailable: {0}")]
    Output(String),
    #[error("unsupported source: {0}")]
    UnsupportedUrl(String),
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("no source loaded")]
    NoSource,
}

pub trait MediaElement {
    /// Replace the current source. Events produced for it carry `load_id`.
    fn load(&mut self, load_id: u64, url: &str) -> Result<(), MediaError>;
    /// Drop the current source, if any.
    fn unload(&mut self);
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);
    fn seek(&mut self, position: f64);
    fn set_volume(&mut self, volume: f64);
    fn set_muted(&mut self, muted: bool);
    fn muted(&self) -> bool;
    fn playback_rate(&self) -> f64 {
        1.0
    }
    /// Events since the last call, oldest first. Never blocks.
    fn poll_events(&mut self) -> Vec<MediaEvent>;
}

/// Map a `file://` URL or a bare path to a filesystem path.
pub(crate) fn local_path(url: &str) -> Option<&str> {
    if let Some(rest) = url.strip_prefix("file://") {
        return Some(rest);
    }
    if url.contains("://") {
        return None;
    }
    Some(url)
}
