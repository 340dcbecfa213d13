//! Playback through the default output device.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};

use crate::decode::{decode_mpeg, PcmBuffer};
use crate::output::{AudioOutput, EventSink, MediaSource, PlaybackControl, PlaybackEvent};
use crate::PlaybackError;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Output that plays on the host's default output device.
///
/// Every started source gets its own stream, owned by a dedicated thread
/// because `cpal::Stream` is not `Send`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeviceOutput;

/// State shared between the control handle and the audio callback.
struct StreamState {
    /// Source frame position (f64 bits stored as u64)
    position: AtomicU64,
    paused: AtomicBool,
    /// Set once `Ended` or `Failed` has been reported
    finished: AtomicBool,
}

impl StreamState {
    fn new() -> Self {
        Self {
            position: AtomicU64::new(0f64.to_bits()),
            paused: AtomicBool::new(false),
            finished: AtomicBool::new(false),
        }
    }

    fn position(&self) -> f64 {
        f64::from_bits(self.position.load(Ordering::Relaxed))
    }

    fn set_position(&self, pos: f64) {
        self.position.store(pos.to_bits(), Ordering::Relaxed);
    }

    /// Returns true for the first caller only.
    fn finish(&self) -> bool {
        !self.finished.swap(true, Ordering::SeqCst)
    }
}

struct DeviceControl {
    state: Arc<StreamState>,
    stop_tx: Mutex<Sender<()>>,
}

impl PlaybackControl for DeviceControl {
    fn pause(&self) {
        self.state.paused.store(true, Ordering::SeqCst);
    }

    fn rewind(&self) {
        self.state.set_position(0.0);
    }
}

impl Drop for DeviceControl {
    fn drop(&mut self) {
        if let Ok(tx) = self.stop_tx.lock() {
            let _ = tx.send(());
        }
    }
}

impl AudioOutput for DeviceOutput {
    fn start(
        &self,
        media: MediaSource,
        events: EventSink,
    ) -> Result<Box<dyn PlaybackControl>, PlaybackError> {
        let pcm = Arc::new(decode_mpeg(&media.bytes)?);
        let state = Arc::new(StreamState::new());

        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), PlaybackError>>();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let thread_state = state.clone();
        let url = media.url.clone();

        thread::Builder::new()
            .name("voiceiq-playback".to_string())
            .spawn(move || {
                let stream = match build_output_stream(pcm, thread_state.clone(), events.clone())
                    .and_then(|stream| {
                        stream
                            .play()
                            .map_err(|e| PlaybackError::StartFailed(e.to_string()))?;
                        Ok(stream)
                    }) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                let _ = ready_tx.send(Ok(()));
                events(PlaybackEvent::Started);

                loop {
                    match stop_rx.recv_timeout(POLL_INTERVAL) {
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                        Err(RecvTimeoutError::Timeout) => {
                            if thread_state.finished.load(Ordering::SeqCst) {
                                break;
                            }
                        }
                    }
                }

                drop(stream);
                log::debug!("Output stream for {} closed", url);
            })
            .map_err(|e| PlaybackError::StartFailed(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|_| PlaybackError::StartFailed("Playback thread exited".to_string()))??;

        Ok(Box::new(DeviceControl {
            state,
            stop_tx: Mutex::new(stop_tx),
        }))
    }
}

fn build_output_stream(
    pcm: Arc<PcmBuffer>,
    state: Arc<StreamState>,
    events: EventSink,
) -> Result<cpal::Stream, PlaybackError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| PlaybackError::StartFailed("No output device available".to_string()))?;

    let supported = device
        .default_output_config()
        .map_err(|e| PlaybackError::StartFailed(format!("Failed to get output config: {}", e)))?;

    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();

    log::debug!(
        "Output device config: {}Hz, {} channel(s), {:?}",
        config.sample_rate.0,
        config.channels,
        sample_format
    );

    match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, pcm, state, events),
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, pcm, state, events),
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, pcm, state, events),
        other => Err(PlaybackError::StartFailed(format!(
            "Unsupported sample format: {:?}",
            other
        ))),
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    pcm: Arc<PcmBuffer>,
    state: Arc<StreamState>,
    events: EventSink,
) -> Result<cpal::Stream, PlaybackError>
where
    T: SizedSample + FromSample<f32>,
{
    let out_channels = config.channels as usize;
    let src_channels = pcm.channels.max(1) as usize;
    let total_frames = pcm.frames() as f64;
    // Source frames advanced per output frame
    let step = pcm.sample_rate as f64 / config.sample_rate.0 as f64;

    let data_state = state.clone();
    let data_events = events.clone();

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                if data_state.paused.load(Ordering::Relaxed)
                    || data_state.finished.load(Ordering::Relaxed)
                {
                    data.fill(T::EQUILIBRIUM);
                    return;
                }

                let mut pos = data_state.position();
                for frame in data.chunks_mut(out_channels) {
                    let src_frame = pos as usize;
                    if pos >= total_frames {
                        frame.fill(T::EQUILIBRIUM);
                        continue;
                    }

                    let base = src_frame * src_channels;
                    for (ch, out) in frame.iter_mut().enumerate() {
                        let src_ch = ch.min(src_channels - 1);
                        let value = pcm.samples.get(base + src_ch).copied().unwrap_or(0.0);
                        *out = T::from_sample(value);
                    }
                    pos += step;
                }
                data_state.set_position(pos);

                if pos >= total_frames && data_state.finish() {
                    data_events(PlaybackEvent::Ended);
                }
            },
            move |err| {
                log::error!("Playback output error: {}", err);
                if state.finish() {
                    events(PlaybackEvent::Failed(err.to_string()));
                }
            },
            None,
        )
        .map_err(|e| PlaybackError::StartFailed(format!("Failed to build output stream: {}", e)))
}
