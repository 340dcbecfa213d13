use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};

use crate::config::ApiConfig;

use super::error::ApiError;
use super::http::HttpTransport;
use super::response::{HealthStatus, VoiceAnswer};
use super::retry::RetryPolicy;

const AUDIO_FIELD: &str = "file";
const AUDIO_FILENAME: &str = "audio.wav";
const AUDIO_MIME: &str = "audio/wav";

/// Client for the VoiceIQ backend
#[derive(Debug, Clone)]
pub struct VoiceClient {
    config: ApiConfig,
    transport: HttpTransport,
    retry: RetryPolicy,
}

impl VoiceClient {
    pub fn new(config: ApiConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: ApiConfig, client: reqwest::Client) -> Self {
        let transport = HttpTransport::new(client, config.base_url.clone(), config.timeout);
        let retry = config.retry_policy();
        Self {
            config,
            transport,
            retry,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Submit a recorded question and return the backend's JSON answer as-is.
    ///
    /// An empty recording is rejected before any request is made.
    /// Transient failures are retried per the configured [`RetryPolicy`].
    pub async fn send_voice(&self, audio: &[u8]) -> Result<serde_json::Value, ApiError> {
        if audio.is_empty() {
            return Err(ApiError::EmptyAudio);
        }

        let url = self.config.ask_voice_url();
        let url = &url;
        info!("Sending {} bytes of audio to {}", audio.len(), url);

        let response = self
            .retry
            .run(|attempt| async move {
                debug!("ask-voice attempt {}", attempt);
                // Multipart bodies are streams, so each attempt builds its own
                let form = audio_form(audio)?;
                let request = self.transport.client().post(url).multipart(form);
                self.transport.fetch_with_timeout(request, None).await
            })
            .await?;

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ApiError::ProcessingFailed {
                details: e.to_string(),
            })
    }

    /// Like [`send_voice`](Self::send_voice), decoding the answer into a [`VoiceAnswer`].
    pub async fn ask_voice(&self, audio: &[u8]) -> Result<VoiceAnswer, ApiError> {
        let body = self.send_voice(audio).await?;
        let answer: VoiceAnswer =
            serde_json::from_value(body).map_err(|e| ApiError::ProcessingFailed {
                details: e.to_string(),
            })?;

        info!(
            "Received answers from {} model(s), {} with audio",
            answer.answers_text.len(),
            answer.audio_answers().count()
        );

        Ok(answer)
    }

    /// Probe the health endpoint. Never fails: any problem reads as unhealthy.
    pub async fn check_health(&self) -> bool {
        let timeout = self.config.health_timeout;
        let request = self.transport.client().get(self.config.health_url());

        let response = match self.transport.fetch_with_timeout(request, Some(timeout)).await {
            Ok(response) => response,
            Err(e) => {
                warn!("API health check failed: {}", e.message());
                return false;
            }
        };

        match tokio::time::timeout(timeout, response.json::<HealthStatus>()).await {
            Ok(Ok(status)) => status.is_ok(),
            Ok(Err(e)) => {
                warn!("API health check failed: {}", e);
                false
            }
            Err(_) => {
                warn!("API health check failed: Request timeout");
                false
            }
        }
    }
}

fn audio_form(audio: &[u8]) -> Result<Form, ApiError> {
    let part = Part::bytes(audio.to_vec())
        .file_name(AUDIO_FILENAME)
        .mime_str(AUDIO_MIME)
        .map_err(|e| ApiError::ProcessingFailed {
            details: format!("Failed to create audio part: {}", e),
        })?;

    Ok(Form::new().part(AUDIO_FIELD, part))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_audio_is_rejected_without_request() {
        // Nothing listens on this address; a request would surface as a network error
        let client = VoiceClient::new(ApiConfig::with_base_url("http://127.0.0.1:9"));

        let error = client.send_voice(&[]).await.unwrap_err();

        assert_eq!(error, ApiError::EmptyAudio);
        assert_eq!(error.status(), 400);
    }

    #[test]
    fn test_audio_form_builds() {
        assert!(audio_form(b"RIFF").is_ok());
    }
}
