use std::sync::Arc;
use std::thread;

use crate::decode::decode_mpeg;
use crate::PlaybackError;

/// Events reported by an output while it plays one media source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Audio started playing.
    Started,
    /// Audio reached its natural end.
    Ended,
    /// Audio failed after it was started.
    Failed(String),
}

/// Callback type receiving playback events.
///
/// Called from whatever thread the output drives audio on.
pub type EventSink = Arc<dyn Fn(PlaybackEvent) + Send + Sync>;

/// In-memory media addressed by a handle URL.
#[derive(Debug, Clone)]
pub struct MediaSource {
    pub url: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

impl MediaSource {
    pub fn new(url: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            url: url.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// Control over one started playback.
pub trait PlaybackControl: Send + Sync {
    /// Pause output. No further events are sent after a pause.
    fn pause(&self);

    /// Move the play position back to the first frame.
    fn rewind(&self);
}

/// Something that can play a [`MediaSource`].
///
/// `start` returns once playback has been scheduled; progress is reported
/// through `events`. An error from `start` means playback never began.
/// `start` may block while it decodes or opens a device.
pub trait AudioOutput: Send + Sync {
    fn start(
        &self,
        media: MediaSource,
        events: EventSink,
    ) -> Result<Box<dyn PlaybackControl>, PlaybackError>;
}

/// Output that decodes the media but produces no sound.
///
/// Decoding runs on a worker thread. A decodable source reports `Started`
/// then `Ended`; an undecodable one reports `Failed`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecodeOnlyOutput;

struct NoopControl;

impl PlaybackControl for NoopControl {
    fn pause(&self) {}
    fn rewind(&self) {}
}

impl AudioOutput for DecodeOnlyOutput {
    fn start(
        &self,
        media: MediaSource,
        events: EventSink,
    ) -> Result<Box<dyn PlaybackControl>, PlaybackError> {
        thread::Builder::new()
            .name("voiceiq-decode".to_string())
            .spawn(move || match decode_mpeg(&media.bytes) {
                Ok(pcm) => {
                    log::debug!(
                        "Decoded {} ({:.2}s) without output device",
                        media.url,
                        pcm.duration().as_secs_f64()
                    );
                    events(PlaybackEvent::Started);
                    events(PlaybackEvent::Ended);
                }
                Err(e) => events(PlaybackEvent::Failed(e.to_string())),
            })
            .map_err(|e| PlaybackError::StartFailed(e.to_string()))?;

        Ok(Box::new(NoopControl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_decode_only_output_reports_failure_for_garbage() {
        let (tx, rx) = mpsc::channel();
        let sink: EventSink = Arc::new(move |event: PlaybackEvent| {
            let _ = tx.send(event);
        });

        let media = MediaSource::new("blob:test", "audio/mpeg", vec![0u8; 128]);
        let _control = DecodeOnlyOutput.start(media, sink).unwrap();

        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(event, PlaybackEvent::Failed(_)));
    }

    #[test]
    fn test_decode_only_output_starts_and_ends_for_mpeg() {
        let hex = include_str!("../testdata/silent_mono_32k.hex");
        let bytes = crate::hex::hex_to_bytes(hex.trim()).unwrap();
        let (tx, rx) = mpsc::channel();
        let sink: EventSink = Arc::new(move |event: PlaybackEvent| {
            let _ = tx.send(event);
        });

        let media = MediaSource::new("blob:test", "audio/mpeg", bytes);
        let _control = DecodeOnlyOutput.start(media, sink).unwrap();

        let events: Vec<_> = rx.iter().take(2).collect();
        assert_eq!(events, vec![PlaybackEvent::Started, PlaybackEvent::Ended]);
    }
}
