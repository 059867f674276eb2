use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::LyricsSettings;

use super::parse::parse_timed_lyrics;
use super::types::{Lyrics, LyricsError, LyricsLookup, LyricsQuery};

/// One entry of the lrclib `/search` response. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LrcLibRecord {
    pub(super) synced_lyrics: Option<String>,
    pub(super) plain_lyrics: Option<String>,
}

/// Client for the lrclib.net search API.
pub struct LrcLibClient {
    http: Client,
    endpoint: String,
}

impl LrcLibClient {
    pub fn new(settings: &LyricsSettings) -> Result<Self, LyricsError> {
        let http = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
        })
    }
}

impl LyricsLookup for LrcLibClient {
    fn lookup(&self, query: &LyricsQuery) -> Result<Option<Lyrics>, LyricsError> {
        let url = build_search_url(&self.endpoint, query);
        debug!(%url, "lrclib search");

        let resp = self.http.get(&url).send()?;

        // 404 means no lyrics found - not an error
        if resp.status().as_u16() == 404 {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(LyricsError::Api(format!("lrclib: HTTP {}", resp.status())));
        }

        let records: Vec<LrcLibRecord> = resp.json()?;
        Ok(lyrics_from_records(records))
    }
}

/// Build the `/search` URL. Album and duration narrow the match when known.
pub(super) fn build_search_url(endpoint: &str, query: &LyricsQuery) -> String {
    let mut params = vec![
        format!("track_name={}", urlencoding::encode(&query.track_name)),
        format!("artist_name={}", urlencoding::encode(&query.artist_name)),
    ];

    if let Some(album) = query.album_name.as_deref().filter(|a| !a.is_empty()) {
        params.push(format!("album_name={}", urlencoding::encode(album)));
    }

    if let Some(d) = query.duration.filter(|d| d.is_finite() && *d > 0.0) {
        // API expects duration in whole seconds
        params.push(format!("duration={}", d.round() as i64));
    }

    format!("{}/search?{}", endpoint, params.join("&"))
}

/// The first record wins: its synced text if present, else its plain text.
pub(super) fn lyrics_from_records(records: Vec<LrcLibRecord>) -> Option<Lyrics> {
    let first = records.into_iter().next()?;
    let plain = first.plain_lyrics.filter(|p| !p.trim().is_empty());

    if let Some(raw) = first.synced_lyrics.filter(|s| !s.trim().is_empty()) {
        return Some(Lyrics::Synced {
            lines: parse_timed_lyrics(&raw),
            raw,
            plain,
        });
    }

    plain.map(|plain| Lyrics::Plain {
        lines: plain.lines().map(str::to_string).collect(),
        plain,
    })
}
