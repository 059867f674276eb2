use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tracing::debug;

use super::types::{LyricsError, LyricsLookup, LyricsReply, LyricsRequest};

/// Asynchronous lyrics retrieval as seen by the player: fire a request,
/// collect replies later from the event loop.
pub trait LyricsFetch {
    /// Queue a lookup. Fails when nothing is left to answer it.
    fn request(&mut self, request: LyricsRequest) -> Result<(), LyricsError>;
    /// Replies that completed since the last call. Never blocks.
    fn poll_replies(&mut self) -> Vec<LyricsReply>;
}

/// Runs lookups on a dedicated thread.
///
/// The thread exits when the worker is dropped.
pub struct LyricsWorker {
    requests: Sender<LyricsRequest>,
    replies: Receiver<LyricsReply>,
}

impl LyricsWorker {
    pub fn spawn<L: LyricsLookup>(lookup: L) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<LyricsRequest>();
        let (reply_tx, reply_rx) = mpsc::channel::<LyricsReply>();

        thread::spawn(move || run(lookup, req_rx, reply_tx));

        Self {
            requests: req_tx,
            replies: reply_rx,
        }
    }
}

fn run<L: LyricsLookup>(lookup: L, requests: Receiver<LyricsRequest>, replies: Sender<LyricsReply>) {
    while let Ok(mut request) = requests.recv() {
        // Skip to the newest queued request; the player drops older replies anyway.
        while let Ok(newer) = requests.try_recv() {
            debug!(skipped = request.ticket, ticket = newer.ticket, "coalescing lyrics requests");
            request = newer;
        }

        let outcome = lookup.lookup(&request.query);
        let reply = LyricsReply {
            ticket: request.ticket,
            track_id: request.track_id,
            outcome,
        };
        if replies.send(reply).is_err() {
            break;
        }
    }
}

impl LyricsFetch for LyricsWorker {
    fn request(&mut self, request: LyricsRequest) -> Result<(), LyricsError> {
        self.requests
            .send(request)
            .map_err(|_| LyricsError::WorkerGone)
    }

    fn poll_replies(&mut self) -> Vec<LyricsReply> {
        self.replies.try_iter().collect()
    }
}
