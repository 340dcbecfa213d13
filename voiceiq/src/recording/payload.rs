use std::io::Cursor;
use std::path::Path;

use log::{debug, warn};

/// Recordings shorter than this rarely transcribe to anything useful
pub const MIN_AUDIO_DURATION_MS: u64 = 500;

/// A recorded question ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoicePayload {
    bytes: Vec<u8>,
    /// Known only when the bytes parse as WAV
    duration_ms: Option<u64>,
}

impl VoicePayload {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let duration_ms = wav_duration_ms(&bytes);
        match duration_ms {
            Some(ms) if ms < MIN_AUDIO_DURATION_MS => {
                warn!(
                    "Audio too short: {}ms < {}ms minimum",
                    ms, MIN_AUDIO_DURATION_MS
                );
            }
            Some(ms) => debug!("Recording duration: {}ms", ms),
            None => debug!("Recording is not WAV, duration unknown"),
        }

        Self { bytes, duration_ms }
    }

    pub fn from_path(path: &Path) -> Result<Self, std::io::Error> {
        let bytes = std::fs::read(path)?;
        debug!("Loaded {} bytes from {:?}", bytes.len(), path);
        Ok(Self::from_bytes(bytes))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }
}

fn wav_duration_ms(bytes: &[u8]) -> Option<u64> {
    let reader = hound::WavReader::new(Cursor::new(bytes)).ok()?;
    let sample_rate = reader.spec().sample_rate as u64;
    if sample_rate == 0 {
        return None;
    }
    Some(reader.duration() as u64 * 1000 / sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(sample_rate: u32, frames: u32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for _ in 0..frames {
                writer.write_sample(0i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_wav_duration() {
        let payload = VoicePayload::from_bytes(wav_bytes(16_000, 16_000));
        assert_eq!(payload.duration_ms(), Some(1000));

        let short = VoicePayload::from_bytes(wav_bytes(16_000, 1_600));
        assert_eq!(short.duration_ms(), Some(100));
        assert!(!short.is_empty());
    }

    #[test]
    fn test_non_wav_bytes_have_unknown_duration() {
        let payload = VoicePayload::from_bytes(b"webm-or-something".to_vec());
        assert_eq!(payload.duration_ms(), None);
        assert_eq!(payload.len(), 17);

        assert!(VoicePayload::from_bytes(Vec::new()).is_empty());
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("question.wav");
        std::fs::write(&path, wav_bytes(8_000, 4_000)).unwrap();

        let payload = VoicePayload::from_path(&path).unwrap();
        assert_eq!(payload.duration_ms(), Some(500));

        let missing = VoicePayload::from_path(&dir.path().join("missing.wav"));
        assert!(missing.is_err());
    }
}
