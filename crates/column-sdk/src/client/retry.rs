//! Retry policy for rate-limited Column API requests.
//!
//! Only HTTP 429 responses are retried. Every other failure is returned to
//! the caller on the first attempt.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::ApiError;

/// Retry policy for rate-limited requests.
///
/// Controls exponential backoff retry behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_retries: u32,

    /// Initial delay before first retry
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Backoff multiplier (e.g., 2.0 for doubling)
    pub backoff_multiplier: f64,

    /// Whether to add jitter to delays
    pub use_jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            use_jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy with custom settings.
    pub fn new(max_retries: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay,
            backoff_multiplier: 2.0,
            use_jitter: true,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Enable jitter (±25% randomization) in retry delays.
    pub fn with_jitter(mut self) -> Self {
        self.use_jitter = true;
        self
    }

    /// Disable jitter in retry delays.
    ///
    /// Use this for deterministic testing or when precise timing is required.
    ///
    /// # Examples
    ///
    /// ```
    /// use column_sdk::client::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::default().without_jitter();
    /// assert_eq!(policy.calculate_delay(1), Duration::from_secs(1));
    /// assert_eq!(policy.calculate_delay(3), Duration::from_secs(4));
    /// ```
    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// Calculate delay for a specific retry attempt.
    ///
    /// Attempt 0 is the initial request and has no delay. Attempt `n` waits
    /// `initial_delay · multiplier^(n-1)`, capped at `max_delay`, with ±25 %
    /// jitter when enabled.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::from_secs(0);
        }

        let multiplier = self.backoff_multiplier.powi(attempt as i32 - 1);
        let delay_ms = (self.initial_delay.as_millis() as f64 * multiplier) as u64;
        let mut delay = Duration::from_millis(delay_ms);

        if delay > self.max_delay {
            delay = self.max_delay;
        }

        if self.use_jitter {
            use rand::Rng;
            let jitter_factor = rand::thread_rng().gen_range(0.75..=1.25);
            delay = Duration::from_millis((delay.as_millis() as f64 * jitter_factor) as u64);
        }

        delay
    }

    /// Check if another retry attempt should be made.
    ///
    /// `attempt` is the number of retries already performed.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}

/// Run `operation`, retrying with backoff while it fails with HTTP 429.
///
/// Returns the first success, the first non-429 error, or the final 429 once
/// the policy's retries are used up.
pub async fn retry_on_rate_limit<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Err(e) if e.is_rate_limited() && policy.should_retry(attempt) => {
                attempt += 1;
                let delay = policy.calculate_delay(attempt);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Rate limited by Column API, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
