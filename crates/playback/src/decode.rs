//! MPEG decoding via symphonia.

use std::io::Cursor;
use std::time::Duration;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::PlaybackError;

/// Decoded interleaved f32 PCM.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmBuffer {
    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }
}

/// Decode an in-memory MPEG audio stream to PCM.
pub fn decode_mpeg(bytes: &[u8]) -> Result<PcmBuffer, PlaybackError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

    let mut hint = Hint::new();
    hint.mime_type("audio/mpeg").with_extension("mp3");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| PlaybackError::Decode(format!("Failed to probe format: {}", e)))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| PlaybackError::Decode("No default track".to_string()))?;

    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(2);
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| PlaybackError::Decode(format!("Failed to create decoder: {}", e)))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(e) => {
                log::warn!("Stopping decode early: {}", e);
                break;
            }
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            // Corrupt frames are skipped
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("Skipping undecodable frame: {}", e);
                continue;
            }
            Err(e) => return Err(PlaybackError::Decode(e.to_string())),
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        channels = spec.channels.count() as u16;

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sample_buf.samples());
    }

    if samples.is_empty() {
        return Err(PlaybackError::Decode("No audio frames".to_string()));
    }

    log::debug!(
        "Decoded {} samples at {}Hz, {} channel(s)",
        samples.len(),
        sample_rate,
        channels
    );

    Ok(PcmBuffer {
        samples,
        sample_rate,
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::hex_to_bytes;

    /// Eight silent MPEG-1 Layer III frames, mono, 32 kbps, 44.1 kHz
    const SILENT_MP3_HEX: &str = include_str!("../testdata/silent_mono_32k.hex");

    #[test]
    fn test_decode_silent_frames() {
        let bytes = hex_to_bytes(SILENT_MP3_HEX.trim()).unwrap();

        let pcm = decode_mpeg(&bytes).unwrap();

        assert_eq!(pcm.sample_rate, 44100);
        assert_eq!(pcm.channels, 1);
        assert!(pcm.frames() > 0);
        assert!(pcm.samples.iter().all(|s| s.abs() < 1e-3));
    }

    #[test]
    fn test_decode_rejects_non_audio_bytes() {
        let result = decode_mpeg(&[0u8; 64]);
        assert!(matches!(result, Err(PlaybackError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_empty_input() {
        assert!(matches!(decode_mpeg(&[]), Err(PlaybackError::Decode(_))));
    }

    #[test]
    fn test_pcm_buffer_duration() {
        let pcm = PcmBuffer {
            samples: vec![0.0; 44100 * 2],
            sample_rate: 44100,
            channels: 2,
        };
        assert_eq!(pcm.frames(), 44100);
        assert_eq!(pcm.duration(), Duration::from_secs(1));
    }
}
