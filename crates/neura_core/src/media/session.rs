//! Voice memo capture/playback coordination.
//!
//! # Responsibility
//! - Wrap a platform media provider behind a small trait.
//! - Enforce at most one active recording and one active playback.
//! - Turn a finished recording into an audio note.
//!
//! # Invariants
//! - Starting a recording tears down any recording still in progress; if
//!   the teardown fails, the old recording stays active and nothing starts.
//! - Starting playback stops any playback still in progress, with the same
//!   rule when stopping fails.
//! - Provider errors are returned to the caller; `finish_into_store` logs
//!   and absorbs them.

use crate::model::note::Note;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::note_store::NoteStore;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, PoisonError};

pub type MediaResult<T> = Result<T, MediaError>;

/// Opaque provider handle for one capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordingHandle(pub u64);

/// Opaque provider handle for one playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackHandle(pub u64);

/// Reference to a recorded asset (file path or platform uri).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub uri: String,
}

impl AssetRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// Invoked by the provider when playback reaches its end.
pub type PlaybackCompletion = Box<dyn FnOnce(PlaybackHandle) + Send + 'static>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// Microphone access was refused by the platform.
    PermissionDenied,
    /// Capture could not start or stop.
    Capture(String),
    /// Playback could not start or stop.
    Playback(String),
    /// `finish`/`cancel` was called with nothing recording.
    NoActiveRecording,
}

impl Display for MediaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "microphone permission denied"),
            Self::Capture(message) => write!(f, "audio capture failed: {message}"),
            Self::Playback(message) => write!(f, "audio playback failed: {message}"),
            Self::NoActiveRecording => write!(f, "no recording in progress"),
        }
    }
}

impl Error for MediaError {}

/// Platform capture/playback backend.
pub trait MediaProvider {
    fn start_recording(&mut self) -> MediaResult<RecordingHandle>;
    fn stop_recording(&mut self, handle: RecordingHandle) -> MediaResult<AssetRef>;
    /// Aborts a capture and discards its asset.
    fn cancel_recording(&mut self, handle: RecordingHandle) -> MediaResult<()>;
    fn play(
        &mut self,
        asset: &AssetRef,
        on_complete: PlaybackCompletion,
    ) -> MediaResult<PlaybackHandle>;
    fn stop_playback(&mut self, handle: PlaybackHandle) -> MediaResult<()>;
}

#[derive(Debug, Clone)]
struct ActivePlayback {
    handle: PlaybackHandle,
    asset: AssetRef,
}

#[derive(Debug, Default)]
struct PlaybackSlot {
    active: Option<ActivePlayback>,
    /// Completion that arrived before `play` returned its handle.
    completed_early: Option<PlaybackHandle>,
}

/// Single-recording, single-playback session over a [`MediaProvider`].
pub struct MediaSession<P: MediaProvider> {
    provider: P,
    recording: Option<RecordingHandle>,
    playback: Arc<Mutex<PlaybackSlot>>,
}

impl<P: MediaProvider> MediaSession<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            recording: None,
            playback: Arc::new(Mutex::new(PlaybackSlot::default())),
        }
    }

    /// Starts capturing, cancelling a capture that is still running.
    ///
    /// If the provider cannot cancel the previous capture, that capture stays
    /// the active one and its error is returned; no second capture starts.
    pub fn start_recording(&mut self) -> MediaResult<RecordingHandle> {
        if let Some(previous) = self.recording {
            warn!(
                "event=recording_start module=media status=teardown previous_handle={}",
                previous.0
            );
            if let Err(err) = self.provider.cancel_recording(previous) {
                error!(
                    "event=recording_cancel module=media status=error handle={} error={}",
                    previous.0, err
                );
                return Err(err);
            }
            self.recording = None;
        }

        let handle = self.provider.start_recording().map_err(|err| {
            error!("event=recording_start module=media status=error error={err}");
            err
        })?;
        self.recording = Some(handle);
        info!(
            "event=recording_start module=media status=ok handle={}",
            handle.0
        );
        Ok(handle)
    }

    /// Stops the active capture and returns its asset.
    ///
    /// On provider failure the capture stays active so it can be retried or
    /// cancelled.
    pub fn finish_recording(&mut self) -> MediaResult<AssetRef> {
        let handle = self.recording.ok_or(MediaError::NoActiveRecording)?;
        let asset = self.provider.stop_recording(handle)?;
        self.recording = None;
        info!(
            "event=recording_finish module=media status=ok handle={}",
            handle.0
        );
        Ok(asset)
    }

    /// Stops the active capture and stores it as an audio note.
    ///
    /// Returns `None` when nothing was recording or the provider failed;
    /// both cases are logged.
    pub fn finish_into_store<S: KeyValueStore>(
        &mut self,
        store: &mut NoteStore<S>,
    ) -> Option<Note> {
        match self.finish_recording() {
            Ok(asset) => store.create_audio(asset.uri),
            Err(err) => {
                error!("event=recording_finish module=media status=error error={err}");
                None
            }
        }
    }

    /// Aborts the active capture. It stays active if the provider fails.
    pub fn cancel_recording(&mut self) -> MediaResult<()> {
        let handle = self.recording.ok_or(MediaError::NoActiveRecording)?;
        self.provider.cancel_recording(handle)?;
        self.recording = None;
        Ok(())
    }

    /// Plays `asset`, stopping whatever is playing first.
    pub fn play(&mut self, asset: AssetRef) -> MediaResult<PlaybackHandle> {
        self.stop_playback()?;

        let slot = Arc::clone(&self.playback);
        let on_complete: PlaybackCompletion = Box::new(move |finished| {
            let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
            let is_current = slot
                .active
                .as_ref()
                .map(|current| current.handle == finished);
            match is_current {
                Some(true) => slot.active = None,
                Some(false) => {}
                None => slot.completed_early = Some(finished),
            }
        });

        let handle = self.provider.play(&asset, on_complete)?;
        {
            let mut slot = self.playback.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.completed_early.take() == Some(handle) {
                return Ok(handle);
            }
            slot.active = Some(ActivePlayback { handle, asset });
        }
        info!(
            "event=playback_start module=media status=ok handle={}",
            handle.0
        );
        Ok(handle)
    }

    /// Stops the active playback, if any.
    ///
    /// The playback stays recorded as active when the provider refuses to
    /// stop it, so a later `play` cannot overlap it.
    pub fn stop_playback(&mut self) -> MediaResult<()> {
        let previous = self
            .playback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .active
            .clone();
        let Some(previous) = previous else {
            return Ok(());
        };

        if let Err(err) = self.provider.stop_playback(previous.handle) {
            error!(
                "event=playback_stop module=media status=error handle={} error={}",
                previous.handle.0, err
            );
            return Err(err);
        }

        let mut slot = self.playback.lock().unwrap_or_else(PoisonError::into_inner);
        if slot
            .active
            .as_ref()
            .is_some_and(|active| active.handle == previous.handle)
        {
            slot.active = None;
        }
        drop(slot);
        info!(
            "event=playback_stop module=media status=ok handle={}",
            previous.handle.0
        );
        Ok(())
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.now_playing().is_some()
    }

    /// Asset currently playing, if any.
    pub fn now_playing(&self) -> Option<AssetRef> {
        self.playback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .active
            .as_ref()
            .map(|active| active.asset.clone())
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}
