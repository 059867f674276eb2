use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use async_io::block_on;
use tracing::{debug, info, warn};
use zbus::object_server::SignalEmitter;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::config::MprisSettings;
use crate::player::{MediaSession, PositionState, RemoteCommand, SessionMetadata, SessionState};

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const NO_TRACK: &str = "/org/mpris/MediaPlayer2/TrackList/NoTrack";

/// A request from the bus. Everything except `Quit` becomes a
/// [`RemoteCommand`] for the player.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    /// Relative, in microseconds.
    Seek(i64),
    /// Absolute, in microseconds. Already checked against the current track.
    SetPosition(i64),
}

impl ControlCmd {
    pub fn into_remote(self) -> Option<RemoteCommand> {
        Some(match self {
            ControlCmd::Quit => return None,
            ControlCmd::Play => RemoteCommand::Play,
            // No separate stopped state: stopping pauses.
            ControlCmd::Pause | ControlCmd::Stop => RemoteCommand::Pause,
            ControlCmd::PlayPause => RemoteCommand::PlayPause,
            ControlCmd::Next => RemoteCommand::Next,
            ControlCmd::Prev => RemoteCommand::Previous,
            ControlCmd::Seek(micros) => RemoteCommand::SeekBy(from_micros(micros)),
            ControlCmd::SetPosition(micros) => RemoteCommand::SeekTo(from_micros(micros)),
        })
    }
}

fn to_micros(seconds: f64) -> i64 {
    if seconds.is_finite() {
        (seconds * 1_000_000.0).round() as i64
    } else {
        0
    }
}

fn from_micros(micros: i64) -> f64 {
    micros as f64 / 1_000_000.0
}

/// D-Bus object path naming `track_id`. Track ids are arbitrary strings, so
/// the path carries a hash of the id.
pub fn track_object_path(track_id: &str) -> OwnedObjectPath {
    let mut hasher = DefaultHasher::new();
    track_id.hash(&mut hasher);
    let path = format!("{OBJECT_PATH}/track/t{:016x}", hasher.finish());
    ObjectPath::try_from(path)
        .map(OwnedObjectPath::from)
        .unwrap_or_else(|_| no_track())
}

fn no_track() -> OwnedObjectPath {
    OwnedObjectPath::from(ObjectPath::from_static_str_unchecked(NO_TRACK))
}

#[derive(Debug)]
enum Notify {
    Properties,
    Seeked(i64),
}

#[derive(Debug)]
struct SharedState {
    status: SessionState,
    metadata: Option<SessionMetadata>,
    track_path: Option<OwnedObjectPath>,
    length_micros: Option<i64>,
    position_micros: i64,
    rate: f64,
    can_go_next: bool,
    can_go_previous: bool,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            status: SessionState::None,
            metadata: None,
            track_path: None,
            length_micros: None,
            position_micros: 0,
            rate: 1.0,
            can_go_next: false,
            can_go_previous: false,
        }
    }
}

/// Player-side half of the MPRIS bridge. Cheap to update; signals are sent
/// from the bus thread.
pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<Notify>,
}

impl MprisHandle {
    fn notify(&self, n: Notify) {
        // The bus thread is gone when there is no session bus.
        let _ = self.notify.send(n);
    }
}

impl MediaSession for MprisHandle {
    fn set_metadata(&mut self, metadata: Option<SessionMetadata>) {
        if let Ok(mut s) = self.state.lock() {
            s.track_path = metadata.as_ref().map(|m| track_object_path(&m.track_id));
            s.length_micros = metadata.as_ref().and_then(|m| m.length).map(to_micros);
            s.position_micros = 0;
            s.metadata = metadata;
        }
        self.notify(Notify::Properties);
    }

    fn set_playback_state(&mut self, state: SessionState) {
        let changed = match self.state.lock() {
            Ok(mut s) => {
                let changed = s.status != state;
                s.status = state;
                changed
            }
            Err(_) => false,
        };
        if changed {
            self.notify(Notify::Properties);
        }
    }

    fn set_position(&mut self, position: PositionState) {
        let length_changed = match self.state.lock() {
            Ok(mut s) => {
                s.position_micros = to_micros(position.position);
                s.rate = position.rate;
                let length = Some(to_micros(position.duration));
                let changed = s.metadata.is_some() && s.length_micros != length;
                if s.metadata.is_some() {
                    s.length_micros = length;
                }
                changed
            }
            Err(_) => false,
        };
        // Position itself is polled by clients; only the track length is
        // part of the metadata.
        if length_changed {
            self.notify(Notify::Properties);
        }
    }

    fn seeked(&mut self, position: f64) {
        let micros = to_micros(position);
        if let Ok(mut s) = self.state.lock() {
            s.position_micros = micros;
        }
        self.notify(Notify::Seeked(micros));
    }

    fn set_navigation(&mut self, can_go_next: bool, can_go_previous: bool) {
        let changed = match self.state.lock() {
            Ok(mut s) => {
                let changed = s.can_go_next != can_go_next || s.can_go_previous != can_go_previous;
                s.can_go_next = can_go_next;
                s.can_go_previous = can_go_previous;
                changed
            }
            Err(_) => false,
        };
        if changed {
            self.notify(Notify::Properties);
        }
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
    identity: String,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> String {
        self.identity.clone()
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

impl PlayerIface {
    fn has_track(&self) -> bool {
        self.state
            .lock()
            .map(|s| s.metadata.is_some())
            .unwrap_or(false)
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    fn seek(&self, offset: i64) {
        let _ = self.tx.send(ControlCmd::Seek(offset));
    }

    fn set_position(&self, track_id: ObjectPath<'_>, position: i64) {
        let current = self
            .state
            .lock()
            .ok()
            .and_then(|s| s.track_path.clone());
        // Requests for a track that is no longer current are ignored.
        match current {
            Some(path) if path.as_str() == track_id.as_str() && position >= 0 => {
                let _ = self.tx.send(ControlCmd::SetPosition(position));
            }
            _ => debug!(%track_id, "ignoring SetPosition for another track"),
        }
    }

    #[zbus(signal)]
    async fn seeked(emitter: &SignalEmitter<'_>, position: i64) -> zbus::Result<()>;

    #[zbus(property)]
    fn playback_status(&self) -> String {
        let Ok(s) = self.state.lock() else {
            return "Stopped".to_string();
        };
        match s.status {
            SessionState::None => "Stopped",
            SessionState::Playing => "Playing",
            SessionState::Paused => "Paused",
        }
        .to_string()
    }

    #[zbus(property)]
    fn rate(&self) -> f64 {
        self.state.lock().map(|s| s.rate).unwrap_or(1.0)
    }

    #[zbus(property)]
    fn minimum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn maximum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.state.lock().map(|s| s.position_micros).unwrap_or(0)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        self.has_track()
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        self.has_track()
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        self.has_track()
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        self.state.lock().map(|s| s.can_go_next).unwrap_or(false)
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        self.state.lock().map(|s| s.can_go_previous).unwrap_or(false)
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let track_path = s.track_path.clone().unwrap_or_else(no_track);
        insert(&mut map, "mpris:trackid", Value::from(track_path.into_inner()));

        let Some(meta) = &s.metadata else {
            return map;
        };
        insert(&mut map, "xesam:title", Value::from(meta.title.clone()));
        insert(&mut map, "xesam:artist", Value::from(vec![meta.artist.clone()]));
        insert(&mut map, "xesam:album", Value::from(meta.album.clone()));
        insert(&mut map, "xesam:url", Value::from(meta.url.clone()));
        if let Some(length) = s.length_micros {
            insert(&mut map, "mpris:length", Value::from(length));
        }
        if let Some(art) = meta.art_url() {
            insert(&mut map, "mpris:artUrl", Value::from(art.to_string()));
        }
        map
    }
}

fn insert(map: &mut HashMap<String, OwnedValue>, key: &str, value: Value<'_>) {
    match OwnedValue::try_from(value) {
        Ok(v) => {
            map.insert(key.to_string(), v);
        }
        Err(e) => debug!(key, "skipping metadata field: {e}"),
    }
}

/// Publish the player on the session bus from a dedicated thread.
///
/// Without a session bus the returned handle still works; updates go nowhere.
pub fn spawn_mpris(tx: Sender<ControlCmd>, settings: &MprisSettings) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<Notify>();

    let state_for_thread = state.clone();
    let bus_name = settings.bus_name.clone();
    let identity = settings.identity.clone();
    std::thread::spawn(move || {
        let connection = block_on(serve(tx, state_for_thread, &bus_name, identity));
        match connection {
            Ok(connection) => {
                info!(%bus_name, "MPRIS service registered");
                forward_notifications(&connection, notify_rx);
            }
            Err(e) => warn!("MPRIS unavailable: {e}"),
        }
    });

    MprisHandle {
        state,
        notify: notify_tx,
    }
}

async fn serve(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
    bus_name: &str,
    identity: String,
) -> zbus::Result<Connection> {
    let connection = Connection::session().await?;
    connection.request_name(bus_name).await?;

    let object_server = connection.object_server();
    object_server
        .at(
            OBJECT_PATH,
            RootIface {
                tx: tx.clone(),
                identity,
            },
        )
        .await?;
    object_server.at(OBJECT_PATH, PlayerIface { tx, state }).await?;

    Ok(connection)
}

/// Turn handle updates into D-Bus signals until the handle is dropped.
fn forward_notifications(connection: &Connection, notify_rx: Receiver<Notify>) {
    while let Ok(first) = notify_rx.recv() {
        let mut properties = false;
        let mut seeks = Vec::new();
        for n in std::iter::once(first).chain(notify_rx.try_iter()) {
            match n {
                Notify::Properties => properties = true,
                Notify::Seeked(micros) => seeks.push(micros),
            }
        }

        let sent = block_on(async {
            let iface_ref = connection
                .object_server()
                .interface::<_, PlayerIface>(OBJECT_PATH)
                .await?;
            let emitter = iface_ref.signal_emitter();
            if properties {
                let iface = iface_ref.get().await;
                iface.playback_status_changed(emitter).await?;
                iface.metadata_changed(emitter).await?;
                iface.can_play_changed(emitter).await?;
                iface.can_pause_changed(emitter).await?;
                iface.can_seek_changed(emitter).await?;
                iface.can_go_next_changed(emitter).await?;
                iface.can_go_previous_changed(emitter).await?;
            }
            // Only the last jump of a burst matters to clients.
            if let Some(&micros) = seeks.last() {
                PlayerIface::seeked(emitter, micros).await?;
            }
            Ok::<(), zbus::Error>(())
        });
        if let Err(e) = sent {
            warn!("MPRIS signal failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests;
