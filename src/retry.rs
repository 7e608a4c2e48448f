//! Opt-in retries for API calls
//!
//! Exponential backoff with jitter around a single request. Clients do not
//! retry unless built with [`SunoClientBuilder::with_retry`](crate::SunoClientBuilder::with_retry);
//! task polling never goes through here.
//!
//! Reads are retried on any retryable error. Submissions create a paid task,
//! so they are repeated only when the connection was never made or the
//! service throttled the call.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::{Result, SunoError};

/// How often and how patiently a failed call is repeated
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first call included
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Delay growth per attempt
    pub multiplier: f64,
    /// Random spread as a fraction of the delay, clamped to 0.0-1.0; 0 or NaN disables it
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub const fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Jitter fraction, clamped to 0.0-1.0
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Backoff before retry number `retry` (0 for the first retry), jitter excluded
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(retry.min(31) as i32);
        Duration::try_from_secs_f64(self.initial_delay.as_secs_f64() * factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Wait before the next attempt; a server `Retry-After` hint replaces the backoff
    fn delay_after(&self, error: &SunoError, retry: u32) -> Duration {
        if let SunoError::RateLimit {
            retry_after: Some(hint),
            ..
        } = error
        {
            return (*hint).min(self.max_delay);
        }
        let base = self.backoff(retry);
        // `jitter` can be set without going through `with_jitter`
        let jitter = if self.jitter.is_finite() {
            self.jitter.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if jitter == 0.0 || base.is_zero() {
            return base;
        }
        let spread = rand::thread_rng().gen_range(-jitter..=jitter);
        base.mul_f64((1.0 + spread).max(0.0))
    }
}

/// Runs an operation under a [`RetryPolicy`]
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub const fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Call `operation` until it succeeds, fails with a non-retryable error
    /// or runs out of attempts. The last error is returned as is.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.execute_if(operation, SunoError::is_retryable).await
    }

    /// Like [`execute`](Self::execute), but `should_retry` decides which
    /// failures are repeated. It sees the operation's own error type, which
    /// may carry more than a [`SunoError`] (whether a request was sent, say).
    pub async fn execute_if<F, Fut, T, E, P>(&self, mut operation: F, should_retry: P) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<SunoError>,
        P: Fn(&E) -> bool,
    {
        let attempts = self.policy.max_attempts.max(1);
        let mut retry = 0;
        loop {
            let failure = match operation().await {
                Ok(value) => return Ok(value),
                Err(failure) => failure,
            };
            let again = should_retry(&failure) && retry + 1 < attempts;
            let error = failure.into();
            if !again {
                return Err(error);
            }

            let delay = self.policy.delay_after(&error, retry);
            warn!(
                attempt = retry + 1,
                max_attempts = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Request failed, retrying"
            );
            tokio::time::sleep(delay).await;
            retry += 1;
        }
    }
}
