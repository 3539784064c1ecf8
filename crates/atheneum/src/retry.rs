//! Caller-side retry policy and call deadlines.
//!
//! The core components never retry on their own - a failed embed, query, or
//! generation call surfaces immediately as a typed error. When the calling
//! layer wants resilience against throttling it wraps the call in
//! [`with_retry`], which backs off exponentially and retries **only**
//! [`crate::Error::ProviderRateLimited`] (never `InvalidInput`, never
//! unavailability), with a strict attempt cap so latency stays bounded.
//!
//! [`with_timeout`] enforces the caller-side deadline on every external
//! call; an elapsed deadline is reported as
//! [`crate::Error::ProviderUnavailable`].

use std::future::Future;
use std::time::Duration;

use crate::error::{Error, Result};

/// Bounded exponential backoff policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    /// Exponential backoff starting at 100ms and capped at 5s, with at most
    /// `max_attempts` total attempts.
    #[must_use]
    pub fn exponential(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self::exponential(1)
    }

    /// Override the initial delay.
    #[must_use]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Override the delay cap.
    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Total attempts this policy allows.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn delay_for(&self, completed_attempts: u32) -> Duration {
        let factor = 2u32.saturating_pow(completed_attempts);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Run `op`, retrying rate-limited failures under the given policy.
///
/// Every other error kind - and a rate limit that persists past the attempt
/// cap - is returned to the caller unchanged.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut completed = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && completed + 1 < policy.max_attempts => {
                let delay = policy.delay_for(completed);
                tracing::warn!(
                    attempt = completed + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "rate limited, backing off before retry"
                );
                tokio::time::sleep(delay).await;
                completed += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Enforce a caller-side deadline on an external call.
///
/// An elapsed deadline is indistinguishable from the provider being down,
/// and is reported as such.
pub async fn with_timeout<T, Fut>(limit: Duration, fut: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::provider_unavailable(format!(
            "call exceeded the {}ms deadline",
            limit.as_millis()
        ))),
    }
}
