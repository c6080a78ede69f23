//! Retry logic.
//!
//! # Responsibilities
//! - Invoke an action up to `max_retries + 1` times
//! - Wait with linear backoff between attempts
//! - Surface the last failure, keeping its classification
//!
//! # Design Decisions
//! - Policy is a plain value passed per call; there is no global policy
//! - Backoff sleeps are Tokio timers and only suspend the calling task
//! - Timeout exhaustion and error exhaustion stay distinguishable so the
//!   handler can pick 504 vs 500

use std::future::Future;
use std::time::{Duration, Instant};

use crate::observability::metrics;
use crate::resilience::backoff::linear_backoff;
use crate::resilience::outcome::{Attempt, AttemptOutcome, OperationError, Outcome};

/// Retry configuration for one call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Linear backoff unit.
    pub backoff: Duration,
    /// Per-attempt deadline, applied by the caller's timeout wrapper.
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration, timeout: Duration) -> Self {
        Self {
            max_retries,
            backoff,
            timeout,
        }
    }

    /// Upper bound on invocations.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// All attempts failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("gave up after {attempts} attempts: {last_error}")]
pub struct RetryExhausted {
    pub attempts: u32,
    pub last_error: OperationError,
}

impl RetryExhausted {
    pub fn is_timeout(&self) -> bool {
        self.last_error.is_timeout()
    }
}

/// Run `action` until it succeeds or the policy's attempt budget is spent.
///
/// `action` is called once per attempt and should already carry its own
/// deadline (see [`crate::resilience::timeouts::with_timeout`]).
pub async fn execute<T, F, Fut>(policy: &RetryPolicy, mut action: F) -> Result<T, RetryExhausted>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Outcome<T>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;
        tracing::info!(endpoint = "retry", attempt, max_attempts, "retry attempt");

        let started = Instant::now();
        let outcome = action().await;
        let record = Attempt {
            number: attempt,
            outcome: AttemptOutcome::of(&outcome),
            elapsed: started.elapsed(),
        };
        metrics::record_attempt(record.outcome);

        let error = match outcome {
            Ok(value) => {
                tracing::debug!(
                    endpoint = "retry",
                    attempt = record.number,
                    elapsed_ms = record.elapsed.as_millis() as u64,
                    "retry succeeded"
                );
                return Ok(value);
            }
            Err(error) => error,
        };

        tracing::warn!(
            endpoint = "retry",
            attempt = record.number,
            outcome = %record.outcome,
            elapsed_ms = record.elapsed.as_millis() as u64,
            error_reason = %error,
            "retry failure"
        );

        if attempt >= max_attempts {
            tracing::error!(
                endpoint = "retry",
                attempts = attempt,
                error_reason = %error,
                "max retries reached"
            );
            return Err(RetryExhausted {
                attempts: attempt,
                last_error: error,
            });
        }

        tokio::time::sleep(linear_backoff(policy.backoff, attempt)).await;
    }
}
