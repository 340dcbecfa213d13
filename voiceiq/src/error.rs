use derive_more::{Display, From};

use crate::clients::ApiError;
use voiceiq_playback::PlaybackError;

#[derive(Debug, Display, From)]
pub enum Error {
    #[from]
    #[display("{_0}")]
    Api(ApiError),

    #[from]
    #[display("{_0}")]
    Playback(PlaybackError),

    #[from]
    #[display("{_0}")]
    Io(std::io::Error),

    #[display("{_0}")]
    Usage(String),

    /// Health probe failed for the backend at this base URL
    #[display("Backend at {_0} is not reachable")]
    Unhealthy(String),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Api(e) => Some(e),
            Error::Playback(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::Usage(_) | Error::Unhealthy(_) => None,
        }
    }
}

/// Display text for any error.
///
/// API errors render as `"{message}: {details}"` (or `"{message}"` without
/// details), also when wrapped in [`Error`]. Everything else uses `Display`.
pub fn format_error_message(error: &(dyn std::error::Error + 'static)) -> String {
    if let Some(api) = error.downcast_ref::<ApiError>() {
        return api.user_message();
    }
    if let Some(Error::Api(api)) = error.downcast_ref::<Error>() {
        return api.user_message();
    }
    error.to_string()
}

/// Display text for a value that is not an error type
pub fn format_display(value: &dyn std::fmt::Display) -> String {
    value.to_string()
}
