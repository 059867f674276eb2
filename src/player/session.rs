//! Outbound side of the system media bridge.
//!
//! The controller describes what is playing through [`MediaSession`]; the
//! host decides how to publish it (MPRIS on Linux).

use crate::library::{Collection, Track, context_album, context_artist, context_cover};

/// Square artwork sizes advertised for the cover image, in pixels.
pub const ARTWORK_SIZES: [u32; 6] = [96, 128, 192, 256, 384, 512];

#[derive(Debug, Clone, PartialEq)]
pub struct Artwork {
    pub src: String,
    /// `"{n}x{n}"`
    pub sizes: String,
    pub mime: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionMetadata {
    pub track_id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub url: String,
    /// Seconds, when known up front.
    pub length: Option<f64>,
    pub artwork: Vec<Artwork>,
}

impl SessionMetadata {
    pub fn describe(track: &Track, collection: Option<&Collection>) -> Self {
        let artwork = context_cover(track, collection)
            .map(|src| {
                ARTWORK_SIZES
                    .iter()
                    .map(|n| Artwork {
                        src: src.to_string(),
                        sizes: format!("{n}x{n}"),
                        mime: "image/png",
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            track_id: track.id.clone(),
            title: track.display_title().to_string(),
            artist: context_artist(track, collection).to_string(),
            album: context_album(track, collection).to_string(),
            url: track.file_url.clone(),
            length: track.duration.filter(|d| d.is_finite() && *d > 0.0),
            artwork,
        }
    }

    /// Largest advertised artwork, if any.
    pub fn art_url(&self) -> Option<&str> {
        self.artwork.last().map(|a| a.src.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    Playing,
    Paused,
    None,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PositionState {
    pub duration: f64,
    pub position: f64,
    pub rate: f64,
}

pub trait MediaSession {
    fn set_metadata(&mut self, metadata: Option<SessionMetadata>);
    fn set_playback_state(&mut self, state: SessionState);
    fn set_position(&mut self, position: PositionState);
    /// The position jumped (as opposed to advancing with playback).
    fn seeked(&mut self, position: f64);
    /// Whether `next` / `previous` can move through the queue.
    fn set_navigation(&mut self, can_go_next: bool, can_go_previous: bool);
}

/// Used when no media control surface is available.
#[derive(Debug, Default)]
pub struct NoSession;

impl MediaSession for NoSession {
    fn set_metadata(&mut self, _metadata: Option<SessionMetadata>) {}
    fn set_playback_state(&mut self, _state: SessionState) {}
    fn set_position(&mut self, _position: PositionState) {}
    fn seeked(&mut self, _position: f64) {}
    fn set_navigation(&mut self, _can_go_next: bool, _can_go_previous: bool) {}
}
