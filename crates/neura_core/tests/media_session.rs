use chrono::NaiveDate;
use neura_core::{
    AssetRef, MediaError, MediaProvider, MediaResult, MediaSession, MemoryKeyValueStore,
    NoteBody, NoteStore, PlaybackCompletion, PlaybackHandle, RecordingHandle,
};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeProvider {
    next_handle: u64,
    deny_microphone: bool,
    complete_immediately: bool,
    refuse_cancel: bool,
    refuse_stop_playback: bool,
    live_recordings: usize,
    live_playbacks: usize,
    cancelled: Vec<RecordingHandle>,
    stopped_playback: Vec<PlaybackHandle>,
    pending: Arc<Mutex<Vec<(PlaybackHandle, PlaybackCompletion)>>>,
}

impl FakeProvider {
    fn next(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn finish_playback(pending: &Arc<Mutex<Vec<(PlaybackHandle, PlaybackCompletion)>>>) {
        let drained: Vec<_> = pending.lock().unwrap().drain(..).collect();
        for (handle, on_complete) in drained {
            on_complete(handle);
        }
    }
}

impl MediaProvider for FakeProvider {
    fn start_recording(&mut self) -> MediaResult<RecordingHandle> {
        if self.deny_microphone {
            return Err(MediaError::PermissionDenied);
        }
        self.live_recordings += 1;
        Ok(RecordingHandle(self.next()))
    }

    fn stop_recording(&mut self, handle: RecordingHandle) -> MediaResult<AssetRef> {
        self.live_recordings -= 1;
        Ok(AssetRef::new(format!("file:///memo-{}.m4a", handle.0)))
    }

    fn cancel_recording(&mut self, handle: RecordingHandle) -> MediaResult<()> {
        if self.refuse_cancel {
            return Err(MediaError::Capture("device busy".to_string()));
        }
        self.live_recordings -= 1;
        self.cancelled.push(handle);
        Ok(())
    }

    fn play(
        &mut self,
        _asset: &AssetRef,
        on_complete: PlaybackCompletion,
    ) -> MediaResult<PlaybackHandle> {
        let handle = PlaybackHandle(self.next());
        if self.complete_immediately {
            on_complete(handle);
        } else {
            self.live_playbacks += 1;
            self.pending.lock().unwrap().push((handle, on_complete));
        }
        Ok(handle)
    }

    fn stop_playback(&mut self, handle: PlaybackHandle) -> MediaResult<()> {
        if self.refuse_stop_playback {
            return Err(MediaError::Playback("busy".to_string()));
        }
        self.live_playbacks -= 1;
        self.stopped_playback.push(handle);
        Ok(())
    }
}

fn store() -> NoteStore<MemoryKeyValueStore> {
    NoteStore::new(MemoryKeyValueStore::new())
        .with_today(|| NaiveDate::from_ymd_opt(2024, 9, 1).unwrap())
}

#[test]
fn starting_a_second_recording_cancels_the_first() {
    let mut session = MediaSession::new(FakeProvider::default());

    let first = session.start_recording().unwrap();
    let second = session.start_recording().unwrap();

    assert_ne!(first, second);
    assert!(session.is_recording());
    assert_eq!(session.provider().cancelled, vec![first]);
}

#[test]
fn finished_recording_becomes_newest_audio_note() {
    let mut session = MediaSession::new(FakeProvider::default());
    let mut store = store();
    store.create_text("older").unwrap();

    let handle = session.start_recording().unwrap();
    let note = session.finish_into_store(&mut store).unwrap();

    assert!(!session.is_recording());
    assert_eq!(
        note.body,
        NoteBody::audio(format!("file:///memo-{}.m4a", handle.0))
    );
    assert_eq!(store.notes()[0].id, note.id);
    assert_eq!(store.len(), 2);
}

#[test]
fn finishing_without_recording_is_reported() {
    let mut session = MediaSession::new(FakeProvider::default());
    let mut store = store();

    assert_eq!(
        session.finish_recording().unwrap_err(),
        MediaError::NoActiveRecording
    );
    assert_eq!(
        session.cancel_recording().unwrap_err(),
        MediaError::NoActiveRecording
    );
    assert!(session.finish_into_store(&mut store).is_none());
    assert!(store.is_empty());
}

#[test]
fn permission_denied_leaves_session_idle() {
    let mut session = MediaSession::new(FakeProvider {
        deny_microphone: true,
        ..FakeProvider::default()
    });

    assert_eq!(
        session.start_recording().unwrap_err(),
        MediaError::PermissionDenied
    );
    assert!(!session.is_recording());
}

#[test]
fn cancelled_recording_creates_nothing() {
    let mut session = MediaSession::new(FakeProvider::default());
    let mut store = store();

    let handle = session.start_recording().unwrap();
    session.cancel_recording().unwrap();

    assert_eq!(session.provider().cancelled, vec![handle]);
    assert!(session.finish_into_store(&mut store).is_none());
    assert!(store.is_empty());
}

#[test]
fn new_playback_stops_the_previous_one() {
    let mut session = MediaSession::new(FakeProvider::default());

    let first = session.play(AssetRef::new("a.m4a")).unwrap();
    let second = session.play(AssetRef::new("b.m4a")).unwrap();

    assert_eq!(session.provider().stopped_playback, vec![first]);
    assert_ne!(first, second);
    assert_eq!(session.now_playing(), Some(AssetRef::new("b.m4a")));
}

#[test]
fn completion_clears_active_playback() {
    let mut session = MediaSession::new(FakeProvider::default());
    let pending = Arc::clone(&session.provider().pending);

    session.play(AssetRef::new("a.m4a")).unwrap();
    assert!(session.is_playing());

    FakeProvider::finish_playback(&pending);
    assert!(!session.is_playing());

    session.stop_playback().unwrap();
    assert!(session.provider().stopped_playback.is_empty());
}

#[test]
fn stale_completion_does_not_clear_newer_playback() {
    let mut session = MediaSession::new(FakeProvider::default());
    let pending = Arc::clone(&session.provider().pending);

    session.play(AssetRef::new("a.m4a")).unwrap();
    session.play(AssetRef::new("b.m4a")).unwrap();

    let stale = pending.lock().unwrap().remove(0);
    (stale.1)(stale.0);

    assert_eq!(session.now_playing(), Some(AssetRef::new("b.m4a")));
}

#[test]
fn synchronous_completion_never_leaves_playback_active() {
    let mut session = MediaSession::new(FakeProvider {
        complete_immediately: true,
        ..FakeProvider::default()
    });

    session.play(AssetRef::new("short.m4a")).unwrap();
    assert!(!session.is_playing());
}

#[test]
fn failed_playback_stop_keeps_previous_playback_active() {
    let mut session = MediaSession::new(FakeProvider {
        refuse_stop_playback: true,
        ..FakeProvider::default()
    });

    session.play(AssetRef::new("a.m4a")).unwrap();
    assert_eq!(
        session.play(AssetRef::new("b.m4a")).unwrap_err(),
        MediaError::Playback("busy".to_string())
    );
    assert!(session.play(AssetRef::new("c.m4a")).is_err());
    assert!(session.stop_playback().is_err());

    assert_eq!(session.now_playing(), Some(AssetRef::new("a.m4a")));
    assert_eq!(session.provider().live_playbacks, 1);
    assert!(session.provider().stopped_playback.is_empty());
}

#[test]
fn failed_recording_teardown_never_starts_a_second_capture() {
    let mut session = MediaSession::new(FakeProvider {
        refuse_cancel: true,
        ..FakeProvider::default()
    });
    let mut store = store();

    let first = session.start_recording().unwrap();
    assert_eq!(
        session.start_recording().unwrap_err(),
        MediaError::Capture("device busy".to_string())
    );
    assert!(session.cancel_recording().is_err());
    assert!(session.is_recording());
    assert_eq!(session.provider().live_recordings, 1);

    let note = session.finish_into_store(&mut store).unwrap();
    assert_eq!(
        note.body,
        NoteBody::audio(format!("file:///memo-{}.m4a", first.0))
    );
    assert_eq!(session.provider().live_recordings, 0);
}
