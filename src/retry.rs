//! Bounded retry for a single asynchronous operation.
//!
//! Retries happen immediately: no backoff, no jitter, and no distinction
//! between transient and permanent failures. Every attempt is a fresh
//! invocation of the operation.

use std::fmt::Display;
use std::future::Future;

use tracing::{debug, error, warn};

/// Default number of attempts per operation
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// Run `operation` under this policy, see [`retry_fetch`]
    pub async fn run<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        retry_fetch(self.max_attempts, operation).await
    }
}

/// Execute `operation` until it succeeds or `max_attempts` attempts have failed.
///
/// Returns the first success, or the error of the final attempt unmodified.
/// A `max_attempts` of zero still runs the operation once.
///
/// # Example
/// ```ignore
/// let weather = retry_fetch(3, || client.fetch_weather(coordinates)).await?;
/// ```
pub async fn retry_fetch<T, E, F, Fut>(max_attempts: u32, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        debug!("Attempt {}/{}", attempt, max_attempts);

        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("Succeeded on attempt {}", attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt < max_attempts => {
                warn!("Attempt {}/{} failed: {}", attempt, max_attempts, e);
                attempt += 1;
            }
            Err(e) => {
                error!("All {} attempts failed, last error: {}", max_attempts, e);
                return Err(e);
            }
        }
    }
}
