use thiserror::Error;

/// One timed lyric line. `time` is in seconds from the start of the track.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedLine {
    pub time: f64,
    pub text: String,
}

/// Lyrics attached to the loaded track.
#[derive(Debug, Clone, PartialEq)]
pub enum Lyrics {
    Synced {
        lines: Vec<TimedLine>,
        /// The LRC text the lines were parsed from.
        raw: String,
        plain: Option<String>,
    },
    Plain {
        lines: Vec<String>,
        plain: String,
    },
}

impl Lyrics {
    pub fn is_synced(&self) -> bool {
        matches!(self, Lyrics::Synced { .. })
    }

    /// Timed lines, empty for plain lyrics.
    pub fn timed_lines(&self) -> &[TimedLine] {
        match self {
            Lyrics::Synced { lines, .. } => lines,
            Lyrics::Plain { .. } => &[],
        }
    }

    pub fn line_count(&self) -> usize {
        match self {
            Lyrics::Synced { lines, .. } => lines.len(),
            Lyrics::Plain { lines, .. } => lines.len(),
        }
    }

    pub fn line_text(&self, index: usize) -> Option<&str> {
        match self {
            Lyrics::Synced { lines, .. } => lines.get(index).map(|l| l.text.as_str()),
            Lyrics::Plain { lines, .. } => lines.get(index).map(String::as_str),
        }
    }
}

/// What a lookup searches for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LyricsQuery {
    pub track_name: String,
    pub artist_name: String,
    pub album_name: Option<String>,
    pub duration: Option<f64>,
}

/// A lookup tagged with the track it was issued for.
#[derive(Debug, Clone, PartialEq)]
pub struct LyricsRequest {
    /// Increases with every request; only the newest one is applied.
    pub ticket: u64,
    pub track_id: String,
    pub query: LyricsQuery,
}

#[derive(Debug)]
pub struct LyricsReply {
    pub ticket: u64,
    pub track_id: String,
    pub outcome: Result<Option<Lyrics>, LyricsError>,
}

#[derive(Error, Debug)]
pub enum LyricsError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
    #[error("lyrics worker is gone")]
    WorkerGone,
}

/// A blocking lyrics source.
pub trait LyricsLookup: Send + 'static {
    fn lookup(&self, query: &LyricsQuery) -> Result<Option<Lyrics>, LyricsError>;
}
