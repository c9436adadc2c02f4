//! Exponential backoff for transient failures.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Bounded exponential backoff.
///
/// [`RetryPolicy::run`] retries [`crate::ClientError::Transient`] failures
/// only; every other error is returned on first occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy. `max_attempts` counts the first try and is at
    /// least one.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Total attempts, including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `retry` (1-based): `base * 2^(retry-1)`,
    /// capped at `max_delay`.
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let shift = retry.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable
    /// error, or the attempt budget is spent.
    ///
    /// # Errors
    ///
    /// Returns the last error produced by `operation`.
    pub async fn run<F, Fut, R>(&self, operation: F) -> ClientResult<R>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClientResult<R>>,
    {
        self.run_if(operation, ClientError::is_retryable).await
    }

    /// Like [`RetryPolicy::run`], retrying only errors for which
    /// `retryable` returns true.
    ///
    /// # Errors
    ///
    /// Returns the last error produced by `operation`.
    pub async fn run_if<F, Fut, R, E>(
        &self,
        mut operation: F,
        retryable: impl Fn(&E) -> bool,
    ) -> Result<R, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Err(err) if retryable(&err) && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    debug!(
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "retrying after transient failure"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(1), Duration::from_secs(30))
    }
}
