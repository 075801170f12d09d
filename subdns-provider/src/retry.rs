//! Bounded retry with exponential backoff.
//!
//! Every outbound provider call is funnelled through [`with_retry`]. Only
//! transient errors ([`ProviderError::is_retryable`]) are retried; business
//! errors propagate on the first attempt. A `retry-after` hint from a
//! rate-limit response is honored exactly (capped at 30 seconds), everything
//! else backs off exponentially from 100 ms up to 10 seconds.

use std::future::Future;
use std::time::Duration;

use crate::error::{ProviderError, Result};

/// Retry budget and backoff shape for provider calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1).
    pub max_attempts: u32,
    /// First backoff delay; doubles per attempt.
    pub base_delay: Duration,
    /// Backoff cap.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries (single attempt).
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

/// Runs `op`, retrying transient failures per `policy`.
///
/// After the budget is spent on transient errors, fails with
/// [`ProviderError::RetriesExhausted`] carrying the last error observed.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    provider: &str,
    op_name: &str,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error: Option<ProviderError> = None;

    for attempt in 0..max_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt + 1 < max_attempts => {
                let delay = retry_delay(policy, &e, attempt);
                log::warn!(
                    "[{provider}] {op_name} failed (attempt {}/{max_attempts}), retrying in {:.1}s: {e}",
                    attempt + 1,
                    delay.as_secs_f32(),
                );
                tokio::time::sleep(delay).await;
                last_error = Some(e);
            }
            Err(e) if e.is_retryable() => {
                log::warn!("[{provider}] {op_name} failed on final attempt: {e}");
                return Err(ProviderError::RetriesExhausted {
                    provider: provider.to_string(),
                    attempts: max_attempts,
                    last_error: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    // Only reachable if max_attempts wrapped; keep the last error if any.
    Err(
        last_error.unwrap_or_else(|| ProviderError::RetriesExhausted {
            provider: provider.to_string(),
            attempts: max_attempts,
            last_error: "no error captured".to_string(),
        }),
    )
}

/// Delay before the next attempt.
///
/// A rate-limit `retry_after` hint wins (capped at 30 s); otherwise
/// exponential backoff.
fn retry_delay(policy: &RetryPolicy, error: &ProviderError, attempt: u32) -> Duration {
    if let ProviderError::RateLimited {
        retry_after: Some(secs),
        ..
    } = error
    {
        Duration::from_secs((*secs).min(30))
    } else {
        backoff_delay(policy, attempt)
    }
}

/// Exponential backoff: `base * 2^attempt`, capped at `max_delay`.
fn backoff_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    let capped_attempt = attempt.min(20); // keep 2^attempt in range
    let factor = 1_u32 << capped_attempt;
    policy
        .base_delay
        .saturating_mul(factor)
        .min(policy.max_delay)
}
