//! Bounded, jittered retries for provider calls.

use crate::error::{Error, Result};
use log::warn;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// How failed calls are retried.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; an operation runs at most `max_retries + 1` times.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on every further retry.
    pub base_delay: Duration,
    /// Upper bound for the exponential delay.
    pub max_delay: Duration,
    /// Spread each delay by up to ±10%.
    pub jitter: bool,
}

impl RetryPolicy {
    /// A policy retrying up to `max_retries` times with the default backoff.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self::new(0)
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Backoff before retry number `attempt + 1` (`attempt` counts from zero).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(31));
        let delay = self.base_delay.saturating_mul(factor).min(self.max_delay);

        if !self.jitter || delay.is_zero() {
            return delay;
        }
        let spread = rand::rng().random_range(-0.1..=0.1);
        Duration::try_from_secs_f64(delay.as_secs_f64() * (1.0 + spread)).unwrap_or(delay)
    }

    /// Delay before retrying after `err`, never shorter than the server's hint.
    pub fn delay_for(&self, attempt: u32, err: &Error) -> Duration {
        let delay = self.backoff(attempt);
        match err.retry_after() {
            Some(hint) => delay.max(hint),
            None => delay,
        }
    }

    /// Run `operation`, retrying transient failures.
    ///
    /// Config, validation, auth, not-collected and generic API errors are
    /// returned from the first attempt. The last error is returned unchanged
    /// once attempts are exhausted.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() || attempt >= self.max_retries => return Err(err),
                Err(err) => {
                    let delay = self.delay_for(attempt, &err);
                    warn!(
                        "Attempt {}/{} failed ({}); retrying in {:?}",
                        attempt + 1,
                        self.max_retries + 1,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            jitter: true,
        }
    }
}

/// Run `operation` with up to `max_retries` retries under the default backoff.
pub async fn with_retry<T, F, Fut>(operation: F, max_retries: u32) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    RetryPolicy::new(max_retries).execute(operation).await
}
