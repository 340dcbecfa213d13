mod error;
mod http;
mod response;
mod retry;
mod voice;

// Re-export public types
pub use error::{ApiError, ErrorKind};
pub use http::HttpTransport;
pub use response::{HealthStatus, VoiceAnswer};
pub use retry::RetryPolicy;
pub use voice::VoiceClient;
