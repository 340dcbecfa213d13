use std::future::Future;
use std::time::Duration;

use log::warn;

use super::error::ApiError;

/// Attempt budget and linear backoff for backend calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// An attempt budget of zero is treated as one attempt.
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base_delay,
        }
    }

    /// A single attempt, no retries
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay after failed attempt `attempt` (1-based): `base_delay * attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempt budget is spent.
    ///
    /// `operation` receives the 1-based attempt number. Attempts never
    /// overlap: the next one starts only after the previous failure and its
    /// backoff delay.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, ApiError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt = 1;
        loop {
            let error = match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            warn!(
                "Attempt {}/{} failed: {}",
                attempt,
                self.attempts,
                error.message()
            );

            if !error.is_retryable() || attempt >= self.attempts {
                return Err(error);
            }

            tokio::time::sleep(self.delay_for(attempt)).await;
            attempt += 1;
        }
    }
}
