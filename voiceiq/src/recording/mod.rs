mod naming;
mod payload;

// Public exports
pub use naming::{RecordingNamer, DEFAULT_LABEL};
pub use payload::{VoicePayload, MIN_AUDIO_DURATION_MS};
