use std::path::Path;

pub const UNKNOWN_TRACK: &str = "Unknown Track";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// A playable item from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub original_filename: Option<String>,
    /// Locator handed to the media element (`file://` URL or plain path).
    pub file_url: String,
    pub cover_art_url: Option<String>,
    /// Known duration in seconds, if the catalog provides one.
    pub duration: Option<f64>,
}

impl Track {
    /// Title shown to the user: tag title, then the file name, then a placeholder.
    pub fn display_title(&self) -> &str {
        non_blank(self.title.as_deref())
            .or_else(|| non_blank(self.original_filename.as_deref()))
            .unwrap_or(UNKNOWN_TRACK)
    }

    pub fn display_artist(&self) -> &str {
        non_blank(self.artist.as_deref()).unwrap_or(UNKNOWN_ARTIST)
    }

    /// "Artist - Title" when an artist is known, otherwise just the title.
    pub fn label(&self) -> String {
        match non_blank(self.artist.as_deref()) {
            Some(artist) => format!("{} - {}", artist, self.display_title()),
            None => self.display_title().to_string(),
        }
    }

    /// Build a track for a local file. The path doubles as the track id.
    pub fn from_path(path: &Path) -> Self {
        let id = path.display().to_string();
        Self {
            file_url: format!("file://{id}"),
            original_filename: path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string),
            id,
            title: None,
            artist: None,
            album: None,
            cover_art_url: None,
            duration: None,
        }
    }
}

/// The album or playlist a queue was started from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    pub id: String,
    pub title: String,
    pub artist: Option<String>,
    /// Username of the collection owner (playlists have no artist).
    pub owner: Option<String>,
    pub cover_art_url: Option<String>,
}

/// Artist shown for `track` when played from `collection`.
pub fn context_artist<'a>(track: &'a Track, collection: Option<&'a Collection>) -> &'a str {
    collection
        .and_then(|c| non_blank(c.artist.as_deref()).or_else(|| non_blank(c.owner.as_deref())))
        .unwrap_or_else(|| track.display_artist())
}

/// Album shown for `track` when played from `collection`; empty when unknown.
pub fn context_album<'a>(track: &'a Track, collection: Option<&'a Collection>) -> &'a str {
    collection
        .and_then(|c| non_blank(Some(c.title.as_str())))
        .or_else(|| non_blank(track.album.as_deref()))
        .unwrap_or("")
}

pub fn context_cover<'a>(track: &'a Track, collection: Option<&'a Collection>) -> Option<&'a str> {
    collection
        .and_then(|c| non_blank(c.cover_art_url.as_deref()))
        .or_else(|| non_blank(track.cover_art_url.as_deref()))
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}
