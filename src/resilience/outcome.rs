//! Outcome types threaded through the timeout wrapper and retry executor.

use std::fmt;
use std::time::Duration;

/// Why a single invocation did not produce a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    /// Failed, but may succeed if tried again.
    #[error("{0}")]
    Transient(String),

    /// Did not finish before its deadline.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
}

impl OperationError {
    pub fn transient(reason: impl Into<String>) -> Self {
        OperationError::Transient(reason.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, OperationError::Timeout(_))
    }
}

/// Result of one invocation: `Ok(payload)`, a transient error, or a timeout.
pub type Outcome<T> = Result<T, OperationError>;

/// Classification of a finished attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Failure,
    Timeout,
}

impl AttemptOutcome {
    pub fn of<T>(outcome: &Outcome<T>) -> Self {
        match outcome {
            Ok(_) => AttemptOutcome::Success,
            Err(OperationError::Transient(_)) => AttemptOutcome::Failure,
            Err(OperationError::Timeout(_)) => AttemptOutcome::Timeout,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptOutcome::Success => "success",
            AttemptOutcome::Failure => "failure",
            AttemptOutcome::Timeout => "timeout",
        }
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded try. Logged and then dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    /// 1-based sequence number.
    pub number: u32,
    pub outcome: AttemptOutcome,
    pub elapsed: Duration,
}
