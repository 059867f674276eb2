use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::config::PlaybackSettings;
use crate::library::{Collection, Track};
use crate::lyrics::{
    Lyrics, LyricsFetch, LyricsQuery, LyricsReply, LyricsRequest, resolve_active_line,
};
use crate::media::{MediaElement, MediaError, MediaEvent, MediaEventKind};
use crate::prefs::PreferenceStore;

use super::events::PlayerEvent;
use super::queue::{Direction, Queue, QueueError};
use super::remote::RemoteCommand;
use super::session::{MediaSession, PositionState, SessionMetadata, SessionState};
use super::state::{PlaybackState, RepeatMode, Transport};

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerOptions {
    /// `previous()` restarts the track once more than this many seconds played.
    pub restart_threshold: f64,
    pub repeat_mode: RepeatMode,
    pub shuffle: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            restart_threshold: 3.0,
            repeat_mode: RepeatMode::Off,
            shuffle: false,
        }
    }
}

impl From<&PlaybackSettings> for ControllerOptions {
    fn from(p: &PlaybackSettings) -> Self {
        Self {
            restart_threshold: p.restart_threshold_secs,
            repeat_mode: p.repeat_mode.into(),
            shuffle: p.shuffle,
        }
    }
}

/// A new queue to install together with the track being played.
#[derive(Debug, Clone)]
pub struct QueueUpdate {
    pub tracks: Vec<Arc<Track>>,
    pub start_index: usize,
}

/// Owns the playback session.
///
/// All state changes go through the methods here, whether they come from
/// key bindings or from the system media bridge. Completions (media events,
/// lyrics replies) are folded in by [`PlayerController::pump`].
pub struct PlayerController<M: MediaElement> {
    media: M,
    session: Box<dyn MediaSession>,
    prefs: Box<dyn PreferenceStore>,
    lyrics_fetch: Option<Box<dyn LyricsFetch>>,
    options: ControllerOptions,

    queue: Queue,
    state: PlaybackState,
    current_track: Option<Arc<Track>>,
    current_collection: Option<Collection>,

    lyrics: Option<Lyrics>,
    active_lyric: Option<usize>,
    lyrics_loading: bool,

    /// Bumped on every source change; media events from older loads are dropped.
    load_id: u64,
    /// Bumped on every lyrics request; only the newest reply is applied.
    lyrics_ticket: u64,

    rng: StdRng,
    events: Vec<PlayerEvent>,
}

impl<M: MediaElement> PlayerController<M> {
    pub fn new(
        mut media: M,
        options: ControllerOptions,
        session: Box<dyn MediaSession>,
        prefs: Box<dyn PreferenceStore>,
        lyrics_fetch: Option<Box<dyn LyricsFetch>>,
    ) -> Self {
        let mut state = PlaybackState {
            repeat_mode: options.repeat_mode,
            is_shuffled: options.shuffle,
            ..PlaybackState::default()
        };
        if let Some(volume) = prefs.load_volume() {
            debug!(volume, "restored volume");
            state.volume = volume;
        }
        media.set_volume(state.volume);

        Self {
            media,
            session,
            prefs,
            lyrics_fetch,
            options,
            queue: Queue::new(),
            state,
            current_track: None,
            current_collection: None,
            lyrics: None,
            active_lyric: None,
            lyrics_loading: false,
            load_id: 0,
            lyrics_ticket: 0,
            rng: StdRng::from_os_rng(),
            events: Vec::new(),
        }
    }

    /// Use a fixed shuffle seed.
    #[cfg(test)]
    pub(crate) fn seed_shuffle(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    // ----- accessors -----

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn transport(&self) -> Transport {
        if self.current_track.is_none() {
            Transport::Idle
        } else if self.state.is_loading {
            Transport::Loading
        } else if self.state.is_playing {
            Transport::Playing
        } else {
            Transport::Paused
        }
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn current_track(&self) -> Option<&Arc<Track>> {
        self.current_track.as_ref()
    }

    pub fn current_collection(&self) -> Option<&Collection> {
        self.current_collection.as_ref()
    }

    pub fn lyrics(&self) -> Option<&Lyrics> {
        self.lyrics.as_ref()
    }

    pub fn active_lyric(&self) -> Option<usize> {
        self.active_lyric
    }

    pub fn lyrics_loading(&self) -> bool {
        self.lyrics_loading
    }

    pub fn has_track(&self) -> bool {
        self.current_track.is_some()
    }

    pub fn has_queue(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn can_go_next(&self) -> bool {
        self.queue.can_go_next(self.state.repeat_mode)
    }

    pub fn can_go_previous(&self) -> bool {
        self.queue.can_go_previous(self.state.repeat_mode)
    }

    /// Change notifications since the last call.
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.events)
    }

    #[cfg(test)]
    pub(crate) fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    // ----- track selection -----

    /// Start `track`, optionally installing a new queue first.
    ///
    /// An invalid queue update is rejected before anything changes. Failing
    /// to start playback is not an error: it is logged and reported through
    /// [`PlayerEvent::PlaybackFailed`].
    pub fn play_track(
        &mut self,
        track: Arc<Track>,
        queue_update: Option<QueueUpdate>,
        collection: Option<Collection>,
    ) -> Result<(), QueueError> {
        if let Some(update) = queue_update {
            self.queue.set(update.tracks, update.start_index)?;
            if self.state.is_shuffled {
                self.queue.shuffle(&mut self.rng);
            }
            self.emit(PlayerEvent::QueueChanged);
        }
        self.current_collection = collection;
        self.load(track);
        Ok(())
    }

    pub fn play_queue(
        &mut self,
        tracks: Vec<Arc<Track>>,
        start_index: usize,
        collection: Option<Collection>,
    ) -> Result<(), QueueError> {
        let Some(track) = tracks.get(start_index).cloned() else {
            return Err(QueueError::IndexOutOfRange {
                index: start_index,
                len: tracks.len(),
            });
        };
        self.play_track(
            track,
            Some(QueueUpdate {
                tracks,
                start_index,
            }),
            collection,
        )
    }

    fn load(&mut self, track: Arc<Track>) {
        self.load_id += 1;
        info!(track = %track.label(), load_id = self.load_id, "loading track");

        self.state.is_loading = true;
        self.state.is_playing = false;
        self.state.position = 0.0;
        self.state.duration = track.duration.filter(|d| d.is_finite() && *d > 0.0).unwrap_or(0.0);
        self.current_track = Some(track.clone());
        self.clear_lyrics();
        self.emit(PlayerEvent::TrackChanged);

        self.session.set_metadata(Some(SessionMetadata::describe(
            &track,
            self.current_collection.as_ref(),
        )));
        self.push_position();

        let started = self
            .media
            .load(self.load_id, &track.file_url)
            .and_then(|()| self.media.play());
        if let Err(e) = started {
            self.playback_failed(e);
        }

        self.request_lyrics(self.lyrics_query(&track));
    }

    fn play_queue_entry(&mut self, index: usize) {
        if let Some(track) = self.queue.get(index).cloned() {
            self.emit(PlayerEvent::QueueChanged);
            self.load(track);
        }
    }

    fn playback_failed(&mut self, error: MediaError) {
        warn!("playback failed: {error}");
        self.state.is_loading = false;
        self.state.is_playing = false;
        self.emit(PlayerEvent::PlaybackFailed(error.to_string()));
    }

    // ----- transport -----

    pub fn toggle_play(&mut self) {
        if self.current_track.is_none() {
            return;
        }
        if self.state.is_playing {
            self.media.pause();
        } else if let Err(e) = self.media.play() {
            self.playback_failed(e);
        }
    }

    /// Jump to `seconds`, clamped to the track when its length is known.
    pub fn seek(&mut self, seconds: f64) {
        if self.current_track.is_none() || !seconds.is_finite() {
            return;
        }
        let mut target = seconds.max(0.0);
        if self.state.duration > 0.0 {
            target = target.min(self.state.duration);
        }
        self.media.seek(target);
        self.state.position = target;
        self.update_active_lyric();
        self.session.seeked(target);
        self.push_position();
        self.emit(PlayerEvent::PositionChanged);
    }

    pub fn seek_by(&mut self, offset: f64) {
        self.seek(self.state.position + offset);
    }

    pub fn set_volume(&mut self, volume: f64) {
        if volume.is_nan() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.state.volume = volume;
        self.media.set_volume(volume);
        if let Err(e) = self.prefs.save_volume(volume) {
            warn!("failed to persist volume: {e}");
        }
        self.emit(PlayerEvent::VolumeChanged);
    }

    pub fn toggle_mute(&mut self) {
        let muted = !self.media.muted();
        self.media.set_muted(muted);
        self.state.is_muted = muted;
        self.emit(PlayerEvent::VolumeChanged);
    }

    pub fn next(&mut self) {
        if self.state.repeat_mode == RepeatMode::One && self.current_track.is_some() {
            self.restart_current();
            return;
        }
        match self.queue.advance(Direction::Next, self.state.repeat_mode) {
            Some(index) => self.play_queue_entry(index),
            None => debug!("next: end of queue"),
        }
    }

    pub fn previous(&mut self) {
        if self.current_track.is_some() && self.state.position > self.options.restart_threshold {
            self.seek(0.0);
            return;
        }
        match self.queue.advance(Direction::Previous, self.state.repeat_mode) {
            Some(index) => self.play_queue_entry(index),
            None => debug!("previous: start of queue"),
        }
    }

    fn restart_current(&mut self) {
        self.seek(0.0);
        if let Err(e) = self.media.play() {
            self.playback_failed(e);
        }
    }

    fn handle_track_end(&mut self) {
        debug!(repeat = self.state.repeat_mode.label(), "track ended");
        if self.state.repeat_mode == RepeatMode::One {
            self.restart_current();
            return;
        }
        // The element reports its own Pause before Ended; playing state is
        // taken from that event alone.
        match self.queue.advance(Direction::Next, self.state.repeat_mode) {
            Some(index) => self.play_queue_entry(index),
            None => debug!("track end: queue finished"),
        }
    }

    // ----- queue -----

    pub fn toggle_repeat(&mut self) {
        self.set_repeat_mode(self.state.repeat_mode.cycle());
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.state.repeat_mode = mode;
        self.emit(PlayerEvent::RepeatChanged);
    }

    pub fn toggle_shuffle(&mut self) {
        if self.state.is_shuffled {
            self.queue.unshuffle();
        } else {
            self.queue.shuffle(&mut self.rng);
        }
        self.state.is_shuffled = !self.state.is_shuffled;
        self.emit(PlayerEvent::ShuffleChanged);
        self.emit(PlayerEvent::QueueChanged);
    }

    pub fn append_to_queue(&mut self, track: Arc<Track>) {
        self.queue.append(track);
        self.emit(PlayerEvent::QueueChanged);
    }

    pub fn remove_from_queue(&mut self, index: usize) -> Result<Arc<Track>, QueueError> {
        let removed = self.queue.remove_at(index)?;
        self.emit(PlayerEvent::QueueChanged);
        Ok(removed)
    }

    /// Stop everything and forget the queue. Volume, mute and repeat survive.
    pub fn clear_queue(&mut self) {
        info!("clearing queue");
        self.queue.clear();
        self.media.pause();
        self.media.unload();
        self.load_id += 1;

        self.current_track = None;
        self.current_collection = None;
        self.state.position = 0.0;
        self.state.duration = 0.0;
        self.state.is_loading = false;
        self.state.is_playing = false;
        self.state.is_shuffled = false;
        self.clear_lyrics();
        // Outstanding lookups belong to the old track.
        self.lyrics_ticket += 1;

        self.session.set_metadata(None);
        self.session.set_playback_state(SessionState::None);
        self.emit(PlayerEvent::Cleared);
    }

    // ----- lyrics -----

    /// Lookups use the track's own tags. Collection fallbacks are for display
    /// only: a playlist owner is not the artist.
    fn lyrics_query(&self, track: &Track) -> LyricsQuery {
        LyricsQuery {
            track_name: track.display_title().to_string(),
            artist_name: track.display_artist().to_string(),
            album_name: track
                .album
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string),
            duration: (self.state.duration > 0.0).then_some(self.state.duration),
        }
    }

    /// Look lyrics up by hand for the loaded track, e.g. after correcting
    /// the artist name. Uses the current duration.
    pub fn search_lyrics(&mut self, track_name: &str, artist_name: &str, album_name: Option<&str>) {
        if self.current_track.is_none() {
            return;
        }
        let query = LyricsQuery {
            track_name: track_name.to_string(),
            artist_name: artist_name.to_string(),
            album_name: album_name.filter(|a| !a.is_empty()).map(str::to_string),
            duration: (self.state.duration > 0.0).then_some(self.state.duration),
        };
        self.request_lyrics(query);
    }

    fn request_lyrics(&mut self, query: LyricsQuery) {
        let Some(track_id) = self.current_track.as_ref().map(|t| t.id.clone()) else {
            return;
        };
        let Some(fetch) = self.lyrics_fetch.as_mut() else {
            return;
        };
        self.lyrics_ticket += 1;
        self.lyrics_loading = true;
        debug!(ticket = self.lyrics_ticket, track = %query.track_name, "requesting lyrics");
        let sent = fetch.request(LyricsRequest {
            ticket: self.lyrics_ticket,
            track_id,
            query,
        });
        if let Err(e) = sent {
            warn!("lyrics lookup not started: {e}");
            self.lyrics_loading = false;
        }
    }

    fn apply_lyrics_reply(&mut self, reply: LyricsReply) {
        let current = self.current_track.as_ref().map(|t| t.id.as_str());
        if reply.ticket != self.lyrics_ticket || current != Some(reply.track_id.as_str()) {
            debug!(ticket = reply.ticket, "dropping stale lyrics reply");
            return;
        }
        self.lyrics_loading = false;
        self.lyrics = match reply.outcome {
            Ok(Some(lyrics)) => Some(lyrics),
            Ok(None) => {
                debug!(track = %reply.track_id, "no lyrics found");
                None
            }
            Err(e) => {
                warn!(track = %reply.track_id, "lyrics lookup failed: {e}");
                None
            }
        };
        self.emit(PlayerEvent::LyricsChanged);
        self.update_active_lyric();
    }

    fn clear_lyrics(&mut self) {
        let had_lyrics = self.lyrics.take().is_some();
        self.lyrics_loading = false;
        if had_lyrics {
            self.emit(PlayerEvent::LyricsChanged);
        }
        self.update_active_lyric();
    }

    fn update_active_lyric(&mut self) {
        let active = self
            .lyrics
            .as_ref()
            .and_then(|l| resolve_active_line(l.timed_lines(), self.state.position));
        if active != self.active_lyric {
            self.active_lyric = active;
            self.emit(PlayerEvent::ActiveLyricChanged(active));
        }
    }

    // ----- completions -----

    /// Fold in media events and lyrics replies that arrived since the last call.
    pub fn pump(&mut self) {
        for event in self.media.poll_events() {
            self.handle_media_event(event);
        }
        let replies = match self.lyrics_fetch.as_mut() {
            Some(fetch) => fetch.poll_replies(),
            None => Vec::new(),
        };
        for reply in replies {
            self.apply_lyrics_reply(reply);
        }
    }

    fn handle_media_event(&mut self, event: MediaEvent) {
        let volume_event = matches!(event.kind, MediaEventKind::VolumeChange { .. });
        if event.load_id != self.load_id && !volume_event {
            debug!(load_id = event.load_id, current = self.load_id, "dropping stale media event");
            return;
        }
        match event.kind {
            MediaEventKind::LoadedMetadata { duration } => {
                if let Some(d) = duration.filter(|d| d.is_finite() && *d > 0.0) {
                    self.state.duration = d;
                    self.emit(PlayerEvent::DurationChanged);
                }
                self.state.is_loading = false;
                self.push_position();
            }
            MediaEventKind::TimeUpdate { position } => {
                if !position.is_finite() {
                    return;
                }
                self.state.position = position.max(0.0);
                self.update_active_lyric();
                self.push_position();
                self.emit(PlayerEvent::PositionChanged);
            }
            MediaEventKind::Play => {
                self.state.is_loading = false;
                self.state.is_playing = true;
                self.session.set_playback_state(SessionState::Playing);
                self.emit(PlayerEvent::PlaybackChanged { playing: true });
            }
            MediaEventKind::Pause => {
                self.state.is_playing = false;
                self.session.set_playback_state(SessionState::Paused);
                self.emit(PlayerEvent::PlaybackChanged { playing: false });
            }
            MediaEventKind::Ended => self.handle_track_end(),
            MediaEventKind::VolumeChange { volume, muted } => {
                self.state.volume = volume;
                self.state.is_muted = muted;
                self.emit(PlayerEvent::VolumeChanged);
            }
            MediaEventKind::Error(message) => {
                warn!("media element error: {message}");
                self.state.is_loading = false;
                self.state.is_playing = false;
                self.emit(PlayerEvent::PlaybackFailed(message));
            }
        }
    }

    // ----- remote -----

    pub fn handle_remote(&mut self, command: RemoteCommand) {
        debug!(?command, "remote command");
        match command {
            RemoteCommand::Play => {
                if !self.state.is_playing {
                    self.toggle_play();
                }
            }
            RemoteCommand::Pause => {
                if self.state.is_playing {
                    self.toggle_play();
                }
            }
            RemoteCommand::PlayPause => self.toggle_play(),
            RemoteCommand::Next => self.next(),
            RemoteCommand::Previous => self.previous(),
            RemoteCommand::SeekTo(position) => self.seek(position),
            RemoteCommand::SeekBy(offset) => self.seek_by(offset),
        }
    }

    // ----- helpers -----

    fn push_position(&mut self) {
        if self.current_track.is_none() {
            return;
        }
        let duration = self.state.duration;
        if !(duration.is_finite() && duration > 0.0) {
            return;
        }
        self.session.set_position(PositionState {
            duration,
            position: self.state.position.clamp(0.0, duration),
            rate: self.media.playback_rate(),
        });
    }

    fn push_navigation(&mut self) {
        let (next, previous) = (self.can_go_next(), self.can_go_previous());
        self.session.set_navigation(next, previous);
    }

    fn emit(&mut self, event: PlayerEvent) {
        if matches!(
            event,
            PlayerEvent::QueueChanged | PlayerEvent::RepeatChanged | PlayerEvent::Cleared
        ) {
            self.push_navigation();
        }
        self.events.push(event);
    }
}
