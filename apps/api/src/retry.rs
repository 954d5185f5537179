//! Bounded retry with exponential backoff, shared by the LLM client and the blob store.
//!
//! `Backoff` is the state machine (attempt count + next delay) and is pure, so the
//! policy can be tested without any I/O. `with_retry` drives it around an async call.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Retry policy: up to `max_attempts` calls, sleeping `initial_backoff * multiplier^(n-1)`
/// after the n-th failure.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_backoff: Duration::from_secs(1),
            multiplier: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    Retry(Duration),
    GiveUp,
}

#[derive(Debug, Clone)]
pub struct Backoff {
    policy: RetryPolicy,
    failures: u32,
}

impl Backoff {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            failures: 0,
        }
    }

    /// Number of failed attempts recorded so far.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Records a failed attempt and decides whether another one is allowed.
    pub fn on_failure(&mut self, retryable: bool) -> RetryDecision {
        self.failures += 1;
        if !retryable || self.failures >= self.policy.max_attempts {
            return RetryDecision::GiveUp;
        }
        let factor = self.policy.multiplier.saturating_pow(self.failures - 1);
        RetryDecision::Retry(self.policy.initial_backoff.saturating_mul(factor))
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the policy is exhausted.
/// The last error is returned on give-up.
pub async fn with_retry<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    label: &str,
    is_retryable: R,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: Display,
{
    let mut backoff = Backoff::new(policy.clone());
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => match backoff.on_failure(is_retryable(&e)) {
                RetryDecision::Retry(delay) => {
                    warn!(
                        attempt = backoff.failures(),
                        delay_ms = delay.as_millis() as u64,
                        "{label} failed: {e}; retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::GiveUp => return Err(e),
            },
        }
    }
}
