use std::time::{Duration, Instant};

use super::lrclib::{LrcLibRecord, build_search_url, lyrics_from_records};
use super::*;

fn line(time: f64, text: &str) -> TimedLine {
    TimedLine {
        time,
        text: text.to_string(),
    }
}

#[test]
fn parses_and_sorts_timed_lines() {
    let text = "[00:10.00]second\n[00:05.50]first\n[01:02.25]third";
    let lines = parse_timed_lyrics(text);
    assert_eq!(
        lines,
        vec![line(5.5, "first"), line(10.0, "second"), line(62.25, "third")]
    );
}

#[test]
fn drops_lines_without_timestamps() {
    let text = "[ar:Someone]\n\nnot a lyric\n[00:01.00]hello";
    let lines = parse_timed_lyrics(text);
    assert_eq!(lines, vec![line(1.0, "hello")]);
}

#[test]
fn keeps_empty_text_as_instrumental_gap() {
    let lines = parse_timed_lyrics("[00:01.00]hi\n[00:04.00]\n[00:06.00]back");
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], line(4.0, ""));
}

#[test]
fn accepts_three_fraction_digits_and_crlf() {
    let lines = parse_timed_lyrics("[00:01.500]a\r\n[00:02.25]b\r\n");
    assert_eq!(lines, vec![line(1.5, "a"), line(2.25, "b")]);
}

#[test]
fn repeated_markers_yield_one_line_each() {
    let lines = parse_timed_lyrics("[00:30.00][00:10.00]chorus\n[00:20.00]verse");
    assert_eq!(
        lines,
        vec![line(10.0, "chorus"), line(20.0, "verse"), line(30.0, "chorus")]
    );
}

#[test]
fn equal_timestamps_keep_source_order() {
    let lines = parse_timed_lyrics("[00:01.00]one\n[00:01.00]two");
    assert_eq!(lines, vec![line(1.0, "one"), line(1.0, "two")]);
}

#[test]
fn empty_input_parses_to_nothing() {
    assert!(parse_timed_lyrics("").is_empty());
}

#[test]
fn resolves_last_line_at_or_before_position() {
    let lines = vec![line(0.0, "a"), line(10.0, "b"), line(20.0, "c")];
    assert_eq!(resolve_active_line(&lines, 15.0), Some(1));
    assert_eq!(resolve_active_line(&lines, 10.0), Some(1));
    assert_eq!(resolve_active_line(&lines, 0.0), Some(0));
    assert_eq!(resolve_active_line(&lines, 99.0), Some(2));
}

#[test]
fn resolves_nothing_before_first_line() {
    let lines = vec![line(5.0, "a"), line(10.0, "b")];
    assert_eq!(resolve_active_line(&lines, 4.99), None);
    assert_eq!(resolve_active_line(&lines, -1.0), None);
    assert_eq!(resolve_active_line(&lines, f64::NAN), None);
    assert_eq!(resolve_active_line(&[], 3.0), None);
}

#[test]
fn search_url_encodes_fields_and_rounds_duration() {
    let query = LyricsQuery {
        track_name: "Hello World".to_string(),
        artist_name: "A&B".to_string(),
        album_name: Some("Live".to_string()),
        duration: Some(182.6),
    };
    assert_eq!(
        build_search_url("https://lrclib.net/api", &query),
        "https://lrclib.net/api/search?track_name=Hello%20World&artist_name=A%26B&album_name=Live&duration=183"
    );
}

#[test]
fn search_url_skips_unknown_album_and_duration() {
    let query = LyricsQuery {
        track_name: "Song".to_string(),
        artist_name: "Band".to_string(),
        album_name: Some(String::new()),
        duration: Some(0.0),
    };
    assert_eq!(
        build_search_url("http://x", &query),
        "http://x/search?track_name=Song&artist_name=Band"
    );
}

fn records(json: &str) -> Vec<LrcLibRecord> {
    serde_json::from_str(json).unwrap()
}

#[test]
fn first_record_with_synced_text_wins() {
    let recs = records(
        r#"[
            {"id": 1, "syncedLyrics": "[00:01.00]la", "plainLyrics": "la"},
            {"id": 2, "syncedLyrics": "[00:09.00]other", "plainLyrics": "other"}
        ]"#,
    );
    let lyrics = lyrics_from_records(recs).unwrap();
    assert!(lyrics.is_synced());
    assert_eq!(lyrics.timed_lines(), &[line(1.0, "la")]);
    match lyrics {
        Lyrics::Synced { raw, plain, .. } => {
            assert_eq!(raw, "[00:01.00]la");
            assert_eq!(plain.as_deref(), Some("la"));
        }
        Lyrics::Plain { .. } => panic!("expected synced lyrics"),
    }
}

#[test]
fn plain_text_is_split_on_newlines() {
    let recs = records(r#"[{"syncedLyrics": null, "plainLyrics": "one\ntwo"}]"#);
    let lyrics = lyrics_from_records(recs).unwrap();
    assert!(!lyrics.is_synced());
    assert_eq!(lyrics.line_count(), 2);
    assert_eq!(lyrics.line_text(1), Some("two"));
    assert!(lyrics.timed_lines().is_empty());
}

#[test]
fn no_records_or_no_text_means_no_lyrics() {
    assert!(lyrics_from_records(Vec::new()).is_none());
    let recs = records(r#"[{"instrumental": true}]"#);
    assert!(lyrics_from_records(recs).is_none());
}

struct EchoLookup;

impl LyricsLookup for EchoLookup {
    fn lookup(&self, query: &LyricsQuery) -> Result<Option<Lyrics>, LyricsError> {
        if query.track_name == "missing" {
            return Ok(None);
        }
        Ok(Some(Lyrics::Plain {
            lines: vec![query.track_name.clone()],
            plain: query.track_name.clone(),
        }))
    }
}

fn wait_for_reply(worker: &mut LyricsWorker) -> LyricsReply {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(reply) = worker.poll_replies().pop() {
            return reply;
        }
        assert!(Instant::now() < deadline, "worker did not reply in time");
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn request(ticket: u64, track: &str) -> LyricsRequest {
    LyricsRequest {
        ticket,
        track_id: format!("id-{track}"),
        query: LyricsQuery {
            track_name: track.to_string(),
            artist_name: "Artist".to_string(),
            ..Default::default()
        },
    }
}

#[test]
fn worker_answers_with_ticket_and_track() {
    let mut worker = LyricsWorker::spawn(EchoLookup);
    assert!(worker.poll_replies().is_empty());

    worker.request(request(7, "song")).unwrap();
    let reply = wait_for_reply(&mut worker);
    assert_eq!(reply.ticket, 7);
    assert_eq!(reply.track_id, "id-song");
    let lyrics = reply.outcome.unwrap().unwrap();
    assert_eq!(lyrics.line_text(0), Some("song"));
}

#[test]
fn worker_passes_through_missing_lyrics() {
    let mut worker = LyricsWorker::spawn(EchoLookup);
    worker.request(request(1, "missing")).unwrap();
    let reply = wait_for_reply(&mut worker);
    assert!(matches!(reply.outcome, Ok(None)));
}

struct BrokenLookup;

impl LyricsLookup for BrokenLookup {
    fn lookup(&self, _query: &LyricsQuery) -> Result<Option<Lyrics>, LyricsError> {
        panic!("lookup thread died");
    }
}

#[test]
fn requests_fail_once_the_worker_thread_is_gone() {
    let mut worker = LyricsWorker::spawn(BrokenLookup);
    worker.request(request(1, "song")).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut ticket = 2;
    loop {
        match worker.request(request(ticket, "song")) {
            Err(LyricsError::WorkerGone) => break,
            Err(other) => panic!("unexpected error: {other}"),
            Ok(()) => {}
        }
        assert!(Instant::now() < deadline, "worker thread did not stop");
        ticket += 1;
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(worker.poll_replies().is_empty());
}
