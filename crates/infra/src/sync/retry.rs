//! Retry policy for rate-limited remote calls
//!
//! Backoff is geometric with ratio 2 and no jitter: wait `initial_delay`,
//! retry, wait double, retry, up to `max_retries` attempts after the first.
//! Only `SyncError::RateLimited` triggers a retry; every other failure is
//! surfaced immediately so conflicts and auth errors stay loud.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use storelink_domain::constants::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_INITIAL_DELAY_MS};

use super::errors::SyncError;

/// Bounded exponential backoff for 429 responses.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(DEFAULT_RETRY_INITIAL_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    /// Run `operation`, retrying on rate limiting until the budget runs out.
    ///
    /// When the budget is exhausted the last `RateLimited` error is returned
    /// unchanged.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T, SyncError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SyncError>>,
    {
        let mut delay = self.initial_delay;
        let mut retries_left = self.max_retries;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.should_retry() && retries_left > 0 => {
                    warn!(
                        delay_ms = delay.as_millis() as u64,
                        retries_left, "Rate limited, backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                    retries_left -= 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
