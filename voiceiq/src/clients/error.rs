use std::time::Duration;

/// Status used when no HTTP status is available (e.g. connection refused)
pub const STATUS_NONE: u16 = 0;
pub const STATUS_TIMEOUT: u16 = 408;

/// Category of an [`ApiError`], derived from its status
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ErrorKind {
    EmptyInput,
    ClientError,
    ServerError,
    Timeout,
    NetworkUnreachable,
    GenericWrapped,
}

/// Error raised at any boundary with the VoiceIQ backend.
///
/// Every variant maps to a `{message, status, details}` triple; see
/// [`ApiError::message`], [`ApiError::status`] and [`ApiError::details`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Empty audio")]
    EmptyAudio,
    #[error("HTTP {status}")]
    Http { status: u16, details: String },
    #[error("Request timeout")]
    Timeout { timeout: Duration },
    #[error("Network error")]
    Network { base_url: String },
    #[error("Failed to process voice")]
    ProcessingFailed { details: String },
}

impl ApiError {
    /// Short message, without details
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP-like status: 0 for no status, 408 for a local timeout
    pub fn status(&self) -> u16 {
        match self {
            ApiError::EmptyAudio => 400,
            ApiError::Http { status, .. } => *status,
            ApiError::Timeout { .. } => STATUS_TIMEOUT,
            ApiError::Network { .. } => STATUS_NONE,
            ApiError::ProcessingFailed { .. } => 500,
        }
    }

    /// Human-readable details, if any
    pub fn details(&self) -> Option<String> {
        let details = match self {
            ApiError::EmptyAudio => "No audio data to send".to_string(),
            ApiError::Http { details, .. } | ApiError::ProcessingFailed { details } => {
                details.clone()
            }
            ApiError::Timeout { timeout } => format!(
                "Request took longer than {}ms. Check if backend is running.",
                timeout.as_millis()
            ),
            ApiError::Network { base_url } => format!(
                "Cannot reach backend. Make sure API is running on {}",
                base_url
            ),
        };

        if details.is_empty() {
            None
        } else {
            Some(details)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::EmptyAudio => ErrorKind::EmptyInput,
            ApiError::Timeout { .. } => ErrorKind::Timeout,
            ApiError::Network { .. } => ErrorKind::NetworkUnreachable,
            ApiError::ProcessingFailed { .. } => ErrorKind::GenericWrapped,
            ApiError::Http { status, .. } if (400..500).contains(status) => {
                ErrorKind::ClientError
            }
            ApiError::Http { .. } => ErrorKind::ServerError,
        }
    }

    /// Client errors (4xx) are never retried, except a local timeout (408).
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Timeout { .. } => true,
            _ => !(400..500).contains(&self.status()),
        }
    }

    /// `"{message}: {details}"`, or just the message when there are no details
    pub fn user_message(&self) -> String {
        match self.details() {
            Some(details) => format!("{}: {}", self.message(), details),
            None => self.message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_retryability() {
        let test_cases = vec![
            ("empty audio", ApiError::EmptyAudio, 400, false),
            (
                "bad request",
                ApiError::Http { status: 400, details: String::new() },
                400,
                false,
            ),
            (
                "unprocessable",
                ApiError::Http { status: 422, details: String::new() },
                422,
                false,
            ),
            (
                "last client status",
                ApiError::Http { status: 499, details: String::new() },
                499,
                false,
            ),
            (
                "server error",
                ApiError::Http { status: 500, details: String::new() },
                500,
                true,
            ),
            (
                "bad gateway",
                ApiError::Http { status: 502, details: String::new() },
                502,
                true,
            ),
            (
                "timeout",
                ApiError::Timeout { timeout: Duration::from_secs(60) },
                408,
                true,
            ),
            (
                "network",
                ApiError::Network { base_url: "http://localhost:8000".into() },
                0,
                true,
            ),
            (
                "wrapped",
                ApiError::ProcessingFailed { details: "boom".into() },
                500,
                true,
            ),
        ];

        for (description, error, status, retryable) in test_cases {
            assert_eq!(error.status(), status, "{}: status", description);
            assert_eq!(error.is_retryable(), retryable, "{}: retryable", description);
        }
    }

    #[test]
    fn test_messages_and_details() {
        let timeout = ApiError::Timeout { timeout: Duration::from_millis(60_000) };
        assert_eq!(timeout.message(), "Request timeout");
        assert_eq!(
            timeout.user_message(),
            "Request timeout: Request took longer than 60000ms. Check if backend is running."
        );

        let network = ApiError::Network { base_url: "http://localhost:8000".into() };
        assert_eq!(
            network.user_message(),
            "Network error: Cannot reach backend. Make sure API is running on http://localhost:8000"
        );

        let http = ApiError::Http { status: 503, details: String::new() };
        assert_eq!(http.details(), None);
        assert_eq!(http.user_message(), "HTTP 503");

        let empty = ApiError::EmptyAudio;
        assert_eq!(empty.user_message(), "Empty audio: No audio data to send");
    }

    #[test]
    fn test_kind() {
        assert_eq!(ApiError::EmptyAudio.kind(), ErrorKind::EmptyInput);
        assert_eq!(
            ApiError::Http { status: 404, details: String::new() }.kind(),
            ErrorKind::ClientError
        );
        assert_eq!(
            ApiError::Http { status: 500, details: String::new() }.kind(),
            ErrorKind::ServerError
        );
        assert_eq!(
            ApiError::Network { base_url: String::new() }.kind(),
            ErrorKind::NetworkUnreachable
        );
        assert_eq!(
            ApiError::ProcessingFailed { details: String::new() }.kind(),
            ErrorKind::GenericWrapped
        );
    }
}
