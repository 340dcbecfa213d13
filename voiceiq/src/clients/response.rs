use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Health probe body: `{"status": "ok", ...}`
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Answer returned by `POST /ask-voice`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceAnswer {
    /// Transcript of the submitted question
    #[serde(default)]
    pub question_voice_text: String,
    /// Text answer per model
    #[serde(default)]
    pub answers_text: BTreeMap<String, String>,
    /// Hex-encoded MPEG answer per model; `None` when synthesis failed
    #[serde(default)]
    pub answers_audio: BTreeMap<String, Option<String>>,
}

impl VoiceAnswer {
    /// Models with an audio answer, in name order
    pub fn audio_answers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.answers_audio
            .iter()
            .filter_map(|(model, hex)| hex.as_deref().map(|hex| (model.as_str(), hex)))
    }
}
