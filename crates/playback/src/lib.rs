//! Audio payload handling for the VoiceIQ client.
//!
//! The backend answers with MPEG audio encoded as a hex string. This crate
//! turns that string back into bytes, decodes the MPEG stream to PCM and
//! hands it to an [`AudioOutput`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use voiceiq_playback::{hex_to_bytes, AudioOutput, DecodeOnlyOutput, MediaSource, PlaybackEvent};
//!
//! fn main() -> Result<(), voiceiq_playback::PlaybackError> {
//!     let bytes = hex_to_bytes(&std::fs::read_to_string("answer.hex").unwrap_or_default())?;
//!     let media = MediaSource::new("blob:example", "audio/mpeg", bytes);
//!     let output = DecodeOnlyOutput;
//!     let _control = output.start(
//!         media,
//!         Arc::new(|event: PlaybackEvent| println!("{:?}", event)),
//!     )?;
//!     Ok(())
//! }
//! ```

mod decode;
mod hex;
mod output;

#[cfg(feature = "device")]
mod device;

pub use decode::{decode_mpeg, PcmBuffer};
pub use hex::{decode_hex_pairs, hex_to_bytes, is_valid_hex_string, MIN_HEX_LEN};
pub use output::{
    AudioOutput, DecodeOnlyOutput, EventSink, MediaSource, PlaybackControl, PlaybackEvent,
};

#[cfg(feature = "device")]
pub use device::DeviceOutput;

use thiserror::Error;

/// Errors raised while preparing or playing an audio answer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlaybackError {
    /// The payload did not pass hex validation.
    #[error("Invalid hex string")]
    InvalidHex,

    /// A hex pair could not be parsed.
    #[error("Failed to convert hex to bytes: {0}")]
    HexConversion(String),

    /// The payload is missing or too small to be audio.
    #[error("Invalid or empty audio data")]
    InvalidAudioData,

    /// The MPEG stream could not be decoded.
    #[error("Failed to decode audio: {0}")]
    Decode(String),

    /// Playback could not be started.
    #[error("Failed to start audio playback: {0}")]
    StartFailed(String),

    /// Playback failed after it started.
    #[error("Audio playback failed: {0}")]
    PlaybackFailed(String),

    /// The media handle was already released.
    #[error("Media not found: {0}")]
    MediaNotFound(String),
}

impl PlaybackError {
    /// Short message suitable for showing next to the answer it belongs to.
    pub fn user_message(&self) -> String {
        match self {
            PlaybackError::InvalidHex
            | PlaybackError::HexConversion(_)
            | PlaybackError::InvalidAudioData => {
                "The audio answer is missing or corrupt.".to_string()
            }
            PlaybackError::Decode(_) => "The audio answer could not be decoded.".to_string(),
            PlaybackError::StartFailed(_) => {
                "Could not start audio playback. Check your output device.".to_string()
            }
            PlaybackError::PlaybackFailed(msg) => format!("Audio playback failed: {}", msg),
            PlaybackError::MediaNotFound(_) => "The audio answer is no longer available.".to_string(),
        }
    }
}
