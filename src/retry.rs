// src/retry.rs

//! Bounded retry with exponential backoff.
//!
//! The delay after failed attempt `n` is `base_delay_secs ^ n` seconds, so the
//! default policy (5 attempts, base 4) waits 4, 16, 64 and 256 seconds between
//! its attempts. There is no jitter: a cache run is a single sequential job,
//! not a fleet of clients hammering the same registry.
//!
//! Sleeping goes through [`Sleeper`] so tests can record the requested delays
//! instead of waiting for them.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::{error, warn};

/// Attempt ceiling and backoff base for one retried operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay after attempt `n` is `base_delay_secs.pow(n)` seconds.
    pub base_delay_secs: u64,
}

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BASE_DELAY_SECS: u64 = 4;

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_secs: DEFAULT_BASE_DELAY_SECS,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_secs: u64) -> Self {
        Self {
            max_attempts,
            base_delay_secs,
        }
    }

    /// Backoff to wait after the given (1-based) failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        Duration::from_secs(self.base_delay_secs.saturating_pow(attempt))
    }

    fn attempt_ceiling(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Abstraction over "wait for this long".
pub trait Sleeper: Send + Sync {
    fn sleep(&self, delay: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Production sleeper backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, delay: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(tokio::time::sleep(delay))
    }
}

/// What happens after a failed attempt. Success is reported as
/// [`Retried`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Another attempt follows after `delay`.
    TransientFailure { delay: Duration },
    /// No attempts are left.
    Exhausted,
}

/// Successful result together with the number of attempts it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retried<T> {
    pub value: T,
    pub attempts: u32,
}

/// Every attempt failed; carries the error of the final one.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl<E: fmt::Display> fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gave up after {} attempts: {}",
            self.attempts, self.last_error
        )
    }
}

/// Run `operation` until it succeeds or the policy's attempt ceiling is hit.
///
/// `operation` receives the 1-based attempt number. No delay follows the
/// final failed attempt.
pub async fn retry_with_backoff<F, Fut, T, E>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    operation_name: &str,
    mut operation: F,
) -> Result<Retried<T>, RetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let ceiling = policy.attempt_ceiling();
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let err = match operation(attempt).await {
            Ok(value) => {
                return Ok(Retried {
                    value,
                    attempts: attempt,
                });
            }
            Err(err) => err,
        };

        match classify_failure(policy, attempt, ceiling) {
            AttemptOutcome::TransientFailure { delay } => {
                warn!(
                    operation = %operation_name,
                    attempt,
                    max_attempts = ceiling,
                    error = %err,
                    delay_secs = delay.as_secs(),
                    "attempt failed, retrying"
                );
                sleeper.sleep(delay).await;
            }
            AttemptOutcome::Exhausted => {
                error!(
                    operation = %operation_name,
                    attempt,
                    error = %err,
                    "attempt failed, no attempts left"
                );
                return Err(RetryExhausted {
                    attempts: attempt,
                    last_error: err,
                });
            }
        }
    }
}

fn classify_failure(policy: &RetryPolicy, attempt: u32, ceiling: u32) -> AttemptOutcome {
    if attempt >= ceiling {
        AttemptOutcome::Exhausted
    } else {
        AttemptOutcome::TransientFailure {
            delay: policy.delay_after(attempt),
        }
    }
}
