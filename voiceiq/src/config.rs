use std::time::Duration;

use crate::clients::RetryPolicy;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60_000); // voice processing is slow
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1_000);
pub const HEALTH_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Hosts treated as a local development backend
const DEVELOPMENT_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

/// Runtime environment. Only affects log verbosity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Development for `localhost` and `127.0.0.1`, production otherwise.
    pub fn from_host(host: &str) -> Self {
        if DEVELOPMENT_HOSTS.contains(&host) {
            Environment::Development
        } else {
            Environment::Production
        }
    }

    /// Derive the environment from the host part of a URL.
    /// A string that does not parse as a URL is taken as a bare host.
    pub fn from_url(url: &str) -> Self {
        match reqwest::Url::parse(url) {
            Ok(parsed) => Self::from_host(parsed.host_str().unwrap_or_default()),
            Err(_) => Self::from_host(url),
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

/// Backend endpoint paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub health: String,
    pub ask_voice: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            health: "/".to_string(),
            ask_voice: "/ask-voice".to_string(),
        }
    }
}

/// Configuration for talking to the VoiceIQ backend.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub endpoints: Endpoints,
    /// Deadline for a single request
    pub timeout: Duration,
    pub retry_attempts: u32,
    /// Base delay for linear backoff between attempts
    pub retry_delay: Duration,
    /// Deadline for the health probe, independent of `timeout`
    pub health_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoints: Endpoints::default(),
            timeout: DEFAULT_TIMEOUT,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            health_timeout: HEALTH_TIMEOUT,
        }
    }
}

impl ApiConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Default config, with `VOICEIQ_BASE_URL` overriding the base URL.
    pub fn from_env() -> Self {
        match std::env::var("VOICEIQ_BASE_URL") {
            Ok(url) if !url.trim().is_empty() => Self::with_base_url(url.trim()),
            _ => Self::default(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn ask_voice_url(&self) -> String {
        self.url(&self.endpoints.ask_voice)
    }

    pub fn health_url(&self) -> String {
        self.url(&self.endpoints.health)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, self.retry_delay)
    }
}
