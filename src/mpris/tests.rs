use super::*;
use std::sync::mpsc;

fn make_metadata() -> SessionMetadata {
    SessionMetadata {
        track_id: "/tmp/music/test.mp3".to_string(),
        title: "Test Title".to_string(),
        artist: "Test Artist".to_string(),
        album: "Test Album".to_string(),
        url: "file:///tmp/music/test.mp3".to_string(),
        length: Some(1.234567),
        artwork: Vec::new(),
    }
}

fn make_handle() -> (MprisHandle, Arc<Mutex<SharedState>>, Receiver<Notify>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<Notify>();
    let handle = MprisHandle {
        state: state.clone(),
        notify: notify_tx,
    };
    (handle, state, notify_rx)
}

#[test]
fn set_metadata_sets_and_clears_shared_state() {
    let (mut handle, state, notify_rx) = make_handle();

    handle.set_metadata(Some(make_metadata()));
    {
        let s = state.lock().unwrap();
        assert_eq!(s.metadata.as_ref().map(|m| m.title.as_str()), Some("Test Title"));
        assert_eq!(s.length_micros, Some(1_234_567));
        assert_eq!(
            s.track_path.as_ref().map(|p| p.as_str().to_string()),
            Some(track_object_path("/tmp/music/test.mp3").as_str().to_string())
        );
    }
    assert!(matches!(notify_rx.try_recv(), Ok(Notify::Properties)));

    handle.set_metadata(None);
    {
        let s = state.lock().unwrap();
        assert!(s.metadata.is_none());
        assert!(s.track_path.is_none());
        assert_eq!(s.length_micros, None);
    }
}

#[test]
fn playback_state_notifies_only_on_change() {
    let (mut handle, _state, notify_rx) = make_handle();
    handle.set_playback_state(SessionState::Playing);
    handle.set_playback_state(SessionState::Playing);
    assert_eq!(notify_rx.try_iter().count(), 1);
}

#[test]
fn position_updates_do_not_notify_unless_length_changes() {
    let (mut handle, state, notify_rx) = make_handle();
    handle.set_metadata(Some(make_metadata()));
    let _ = notify_rx.try_iter().count();

    handle.set_position(PositionState {
        duration: 1.234567,
        position: 0.5,
        rate: 1.0,
    });
    assert_eq!(notify_rx.try_iter().count(), 0);
    assert_eq!(state.lock().unwrap().position_micros, 500_000);

    handle.set_position(PositionState {
        duration: 200.0,
        position: 0.5,
        rate: 1.0,
    });
    assert_eq!(notify_rx.try_iter().count(), 1);
    assert_eq!(state.lock().unwrap().length_micros, Some(200_000_000));
}

#[test]
fn seeked_sends_signal_with_micros() {
    let (mut handle, state, notify_rx) = make_handle();
    handle.seeked(12.5);
    assert!(matches!(notify_rx.try_recv(), Ok(Notify::Seeked(12_500_000))));
    assert_eq!(state.lock().unwrap().position_micros, 12_500_000);
}

#[test]
fn playback_status_maps_state_to_mpris_strings() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    assert_eq!(iface.playback_status(), "Stopped");

    state.lock().unwrap().status = SessionState::Playing;
    assert_eq!(iface.playback_status(), "Playing");

    state.lock().unwrap().status = SessionState::Paused;
    assert_eq!(iface.playback_status(), "Paused");
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let (mut handle, state, _notify_rx) = make_handle();
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx, state };

    let empty = iface.metadata();
    assert_eq!(empty.len(), 1);
    assert!(empty.contains_key("mpris:trackid"));

    let mut meta = make_metadata();
    meta.artwork = vec![crate::player::Artwork {
        src: "https://img/cover.png".to_string(),
        sizes: "512x512".to_string(),
        mime: "image/png",
    }];
    handle.set_metadata(Some(meta));

    let map = iface.metadata();
    for k in [
        "mpris:trackid",
        "xesam:title",
        "xesam:artist",
        "xesam:album",
        "xesam:url",
        "mpris:length",
        "mpris:artUrl",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}

#[test]
fn set_position_is_forwarded_only_for_current_track() {
    let (mut handle, state, _notify_rx) = make_handle();
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx, state };
    handle.set_metadata(Some(make_metadata()));

    let current = track_object_path("/tmp/music/test.mp3");
    let other = track_object_path("/tmp/music/other.mp3");
    iface.set_position(other.into_inner(), 1_000_000);
    iface.set_position(current.clone().into_inner(), -5);
    iface.set_position(current.into_inner(), 3_000_000);

    let sent: Vec<_> = rx.try_iter().collect();
    assert_eq!(sent, vec![ControlCmd::SetPosition(3_000_000)]);
}

#[test]
fn navigation_flags_are_published_and_notify_on_change() {
    let (mut handle, state, notify_rx) = make_handle();
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };
    assert!(!iface.can_go_next());
    assert!(!iface.can_go_previous());

    handle.set_navigation(true, false);
    handle.set_navigation(true, false);
    assert_eq!(notify_rx.try_iter().count(), 1);
    assert!(iface.can_go_next());
    assert!(!iface.can_go_previous());

    handle.set_navigation(false, true);
    assert!(matches!(notify_rx.try_recv(), Ok(Notify::Properties)));
    assert!(!iface.can_go_next());
    assert!(iface.can_go_previous());
}

#[test]
fn transport_methods_send_control_commands() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx, state };

    iface.play();
    iface.pause();
    iface.play_pause();
    iface.next();
    iface.previous();
    iface.seek(-10_000_000);

    let sent: Vec<_> = rx.try_iter().collect();
    assert_eq!(
        sent,
        vec![
            ControlCmd::Play,
            ControlCmd::Pause,
            ControlCmd::PlayPause,
            ControlCmd::Next,
            ControlCmd::Prev,
            ControlCmd::Seek(-10_000_000),
        ]
    );
}

#[test]
fn control_commands_map_to_remote_commands() {
    assert_eq!(ControlCmd::Quit.into_remote(), None);
    assert_eq!(ControlCmd::Stop.into_remote(), Some(RemoteCommand::Pause));
    assert_eq!(ControlCmd::Prev.into_remote(), Some(RemoteCommand::Previous));
    assert_eq!(
        ControlCmd::Seek(-2_500_000).into_remote(),
        Some(RemoteCommand::SeekBy(-2.5))
    );
    assert_eq!(
        ControlCmd::SetPosition(90_000_000).into_remote(),
        Some(RemoteCommand::SeekTo(90.0))
    );
}

#[test]
fn track_paths_are_valid_and_stable() {
    let a = track_object_path("/music/a b/ü.flac");
    assert_eq!(a, track_object_path("/music/a b/ü.flac"));
    assert_ne!(a, track_object_path("/music/other.flac"));
    assert!(a.as_str().starts_with("/org/mpris/MediaPlayer2/track/t"));
}
