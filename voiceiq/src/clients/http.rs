use std::time::Duration;

use log::{debug, error};
use reqwest::{RequestBuilder, Response};

use super::error::ApiError;

/// Issues single requests against the backend with a deadline.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    default_timeout: Duration,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, default_timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            default_timeout,
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Send `request`, giving up after `timeout` (default: the configured
    /// request timeout).
    ///
    /// The deadline covers the wait for the response head; the caller reads
    /// the body. Non-success statuses become [`ApiError::Http`] with details
    /// taken from a JSON `detail` or `message` field when the body has one.
    pub async fn fetch_with_timeout(
        &self,
        request: RequestBuilder,
        timeout: Option<Duration>,
    ) -> Result<Response, ApiError> {
        let timeout = timeout.unwrap_or(self.default_timeout);

        // The deadline timer is owned by this future and dropped on every return path
        let response = match tokio::time::timeout(timeout, request.send()).await {
            Err(_elapsed) => return Err(ApiError::Timeout { timeout }),
            Ok(Err(e)) if e.is_timeout() => return Err(ApiError::Timeout { timeout }),
            Ok(Err(e)) => {
                error!("API request error: {}", e);
                return Err(ApiError::Network {
                    base_url: self.base_url.clone(),
                });
            }
            Ok(Ok(response)) => response,
        };

        let status = response.status();
        debug!("{} responded with {}", response.url(), status);

        if !status.is_success() {
            let details = error_details(response).await;
            return Err(ApiError::Http {
                status: status.as_u16(),
                details,
            });
        }

        Ok(response)
    }
}

/// Best-effort extraction of an error description from a JSON body.
async fn error_details(response: Response) -> String {
    match response.json::<serde_json::Value>().await {
        Ok(body) => details_from_body(&body),
        // Body is not JSON
        Err(_) => String::new(),
    }
}

fn details_from_body(body: &serde_json::Value) -> String {
    let field = |name: &str| match body.get(name) {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) if s.is_empty() => None,
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    };

    field("detail").or_else(|| field("message")).unwrap_or_default()
}
