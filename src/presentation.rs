//! Window title mirroring of the now-playing track.

use std::io::{self, Write};

use crossterm::execute;
use crossterm::terminal::SetTitle;

use crate::library::{Collection, Track, context_artist};

/// `"{title} - {artist} | {app}"`, or just the app name when nothing is loaded.
pub fn window_title(track: Option<&Track>, collection: Option<&Collection>, app_name: &str) -> String {
    match track {
        Some(t) => format!(
            "{} - {} | {}",
            t.display_title(),
            context_artist(t, collection),
            app_name
        ),
        None => app_name.to_string(),
    }
}

/// Writes the terminal title, skipping writes when it did not change.
#[derive(Debug, Default)]
pub struct TitleMirror {
    last: Option<String>,
}

impl TitleMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether anything was written.
    pub fn update<W: Write>(&mut self, out: &mut W, title: &str) -> io::Result<bool> {
        if self.last.as_deref() == Some(title) {
            return Ok(false);
        }
        execute!(out, SetTitle(title))?;
        self.last = Some(title.to_string());
        Ok(true)
    }

    #[cfg(test)]
    pub(crate) fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> Track {
        Track {
            id: "1".to_string(),
            title: Some("Blue".to_string()),
            artist: Some("Joni".to_string()),
            album: None,
            original_filename: None,
            file_url: "file:///blue.flac".to_string(),
            cover_art_url: None,
            duration: None,
        }
    }

    #[test]
    fn title_names_track_artist_and_app() {
        assert_eq!(window_title(Some(&track()), None, "Sono"), "Blue - Joni | Sono");
    }

    #[test]
    fn title_prefers_collection_artist() {
        let collection = Collection {
            artist: Some("Various".to_string()),
            ..Collection::default()
        };
        assert_eq!(
            window_title(Some(&track()), Some(&collection), "Sono"),
            "Blue - Various | Sono"
        );
    }

    #[test]
    fn title_falls_back_to_placeholders() {
        let mut t = track();
        t.title = None;
        t.artist = None;
        assert_eq!(
            window_title(Some(&t), None, "Sono"),
            "Unknown Track - Unknown Artist | Sono"
        );
        assert_eq!(window_title(None, None, "Sono"), "Sono");
    }

    #[test]
    fn mirror_writes_only_on_change() {
        let mut mirror = TitleMirror::new();
        let mut out = Vec::new();

        assert!(mirror.update(&mut out, "A | Sono").unwrap());
        let written = out.len();
        assert!(written > 0);

        assert!(!mirror.update(&mut out, "A | Sono").unwrap());
        assert_eq!(out.len(), written);

        assert!(mirror.update(&mut out, "B | Sono").unwrap());
        assert!(out.len() > written);
        assert_eq!(mirror.last(), Some("B | Sono"));
    }
}
