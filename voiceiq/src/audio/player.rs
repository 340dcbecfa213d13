use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::{debug, error, info};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use voiceiq_playback::{
    hex_to_bytes, is_valid_hex_string, AudioOutput, EventSink, PlaybackControl, PlaybackError,
    PlaybackEvent,
};

use super::blob::{Blob, BlobStore};

/// MIME type of the audio answers produced by the backend
pub const ANSWER_MIME_TYPE: &str = "audio/mpeg";

/// How a playback that did not fail came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum PlaybackOutcome {
    /// Played to the end
    Finished,
    /// Interrupted by [`AudioPlayer::stop_all`]
    Stopped,
}

struct ActivePlayback {
    control: Box<dyn PlaybackControl>,
    cancel: CancellationToken,
}

/// Removes a playback from the registry when dropped.
struct Registration {
    active: Arc<Mutex<HashMap<Uuid, ActivePlayback>>>,
    id: Uuid,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.active.lock().unwrap().remove(&self.id);
    }
}

/// Plays hex-encoded audio answers and tracks what is currently playing.
#[derive(Clone)]
pub struct AudioPlayer {
    output: Arc<dyn AudioOutput>,
    blobs: BlobStore,
    /// Currently playing sources, keyed by playback id
    active: Arc<Mutex<HashMap<Uuid, ActivePlayback>>>,
}

impl AudioPlayer {
    pub fn new(output: Arc<dyn AudioOutput>) -> Self {
        Self {
            output,
            blobs: BlobStore::new(),
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn blob_store(&self) -> &BlobStore {
        &self.blobs
    }

    /// Number of playbacks currently in progress
    pub fn active_count(&self) -> usize {
        self.active.lock().unwrap().len()
    }

    /// Decode and play a hex-encoded MPEG answer.
    ///
    /// Resolves once: when playback ends, fails, or is stopped.
    pub async fn play_from_hex(&self, hex: &str) -> Result<PlaybackOutcome, PlaybackError> {
        self.play_from_hex_with(hex, |_| {}).await
    }

    /// Like [`play_from_hex`](Self::play_from_hex), calling `on_error` before
    /// returning any error.
    pub async fn play_from_hex_with<F>(
        &self,
        hex: &str,
        on_error: F,
    ) -> Result<PlaybackOutcome, PlaybackError>
    where
        F: FnOnce(&PlaybackError),
    {
        let result = self.play(hex).await;
        if let Err(e) = &result {
            error!("Error playing audio: {}", e);
            on_error(e);
        }
        result
    }

    /// Pause and rewind everything that is playing, then resolve each
    /// playback as [`PlaybackOutcome::Stopped`]. No-op when idle.
    pub fn stop_all(&self) {
        let active = self.active.lock().unwrap();
        if active.is_empty() {
            return;
        }

        debug!("Stopping {} playback(s)", active.len());
        for playback in active.values() {
            playback.control.pause();
            playback.control.rewind();
            playback.cancel.cancel();
        }
    }

    async fn play(&self, hex: &str) -> Result<PlaybackOutcome, PlaybackError> {
        if !is_valid_hex_string(hex) {
            return Err(PlaybackError::InvalidAudioData);
        }

        let bytes = hex_to_bytes(hex)?;
        debug!("Decoded {} bytes of audio from hex", bytes.len());

        let mut url_guard = self
            .blobs
            .create_guarded_url(Blob::new(bytes, ANSWER_MIME_TYPE));
        let media = self
            .blobs
            .resolve(url_guard.url())
            .ok_or_else(|| PlaybackError::MediaNotFound(url_guard.url().to_string()))?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let events: EventSink = Arc::new(move |event: PlaybackEvent| {
            let _ = tx.send(event);
        });

        // Starting may decode and open a device, so it runs off the async runtime.
        // Dropping the guard on an early return revokes the URL.
        let output = self.output.clone();
        let control = tokio::task::spawn_blocking(move || output.start(media, events))
            .await
            .map_err(|e| PlaybackError::StartFailed(e.to_string()))??;

        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        self.active.lock().unwrap().insert(
            id,
            ActivePlayback {
                control,
                cancel: cancel.clone(),
            },
        );
        let _registration = Registration {
            active: self.active.clone(),
            id,
        };

        let outcome = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Audio playback stopped");
                    break Ok(PlaybackOutcome::Stopped);
                }
                event = rx.recv() => match event {
                    Some(PlaybackEvent::Started) => info!("Audio playback started"),
                    Some(PlaybackEvent::Ended) => {
                        info!("Audio playback ended");
                        break Ok(PlaybackOutcome::Finished);
                    }
                    Some(PlaybackEvent::Failed(msg)) => {
                        break Err(PlaybackError::PlaybackFailed(msg));
                    }
                    None => {
                        break Err(PlaybackError::PlaybackFailed(
                            "output closed before playback ended".to_string(),
                        ));
                    }
                },
            }
        };

        // First terminal event wins; later events are never read
        url_guard.release();
        outcome
    }
}
