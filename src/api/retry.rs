use std::future::Future;
use std::time::Duration;

use super::ApiError;

pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Exponential backoff: `base_delay * 2^n` before retry `n` (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, base_delay: Duration) -> Self {
        Self {
            retries,
            base_delay,
        }
    }

    /// No retries at all.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Delay before retry number `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(retry))
    }

    /// The full delay sequence this policy will sleep through when every
    /// attempt fails.
    pub fn delays(&self) -> Vec<Duration> {
        (0..self.retries).map(|r| self.delay_for(r)).collect()
    }
}

/// Run `op`, retrying transient failures according to `policy`.
///
/// Only [`ApiError::is_retryable`] failures are retried; anything else, and
/// the last failure once retries run out, is returned unchanged.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut retry = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && retry < policy.retries => {
                let delay = policy.delay_for(retry);
                retry += 1;
                tracing::warn!(
                    "Request failed ({}), retry {}/{} in {}ms",
                    e,
                    retry,
                    policy.retries,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
