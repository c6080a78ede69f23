//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound a single invocation with a deadline
//! - Cancel the in-flight future when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Cancellation is dropping the future; committed side effects stay

use std::future::Future;
use std::time::Duration;

use crate::resilience::outcome::{OperationError, Outcome};

/// Run `operation`, giving up after `limit`.
///
/// The operation's own result passes through untouched when it finishes in
/// time. Otherwise the future is dropped and `OperationError::Timeout` is
/// returned.
pub async fn with_timeout<T, F>(limit: Duration, operation: F) -> Outcome<T>
where
    F: Future<Output = Outcome<T>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(outcome) => outcome,
        Err(_) => Err(OperationError::Timeout(limit)),
    }
}
