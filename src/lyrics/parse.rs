use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::types::TimedLine;

static TIMESTAMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d{1,3}):(\d{2})\.(\d{2,3})\]").unwrap());

/// Parse LRC text into timed lines sorted by time.
///
/// Lines without a `[mm:ss.cc]` marker (headers such as `[ar:...]`, blank
/// lines, garbage) are dropped. A line carrying several markers yields one
/// entry per marker. Empty text is kept: it marks an instrumental gap.
pub fn parse_timed_lyrics(text: &str) -> Vec<TimedLine> {
    let mut lines = Vec::new();
    for line in text.lines() {
        let stamps: Vec<f64> = TIMESTAMP_RE
            .captures_iter(line)
            .filter_map(|cap| stamp_seconds(&cap))
            .collect();
        if stamps.is_empty() {
            continue;
        }
        let body = TIMESTAMP_RE.replace_all(line, "");
        let body = body.trim();
        for time in stamps {
            lines.push(TimedLine {
                time,
                text: body.to_string(),
            });
        }
    }
    // sort_by is stable, so equal timestamps keep their source order.
    lines.sort_by(|a, b| a.time.total_cmp(&b.time));
    lines
}

fn stamp_seconds(cap: &Captures<'_>) -> Option<f64> {
    let minutes: u32 = cap.get(1)?.as_str().parse().ok()?;
    let seconds: u32 = cap.get(2)?.as_str().parse().ok()?;
    let frac = cap.get(3)?.as_str();
    let frac_value: u32 = frac.parse().ok()?;
    let scale = 10f64.powi(frac.len() as i32);
    Some(minutes as f64 * 60.0 + seconds as f64 + frac_value as f64 / scale)
}

/// Index of the last line whose time is `<= position`, or `None` when the
/// position precedes every line (or is NaN).
///
/// Linear scan from the end; lyric sets are a few hundred lines at most.
pub fn resolve_active_line(lines: &[TimedLine], position: f64) -> Option<usize> {
    lines.iter().rposition(|line| line.time <= position)
}
