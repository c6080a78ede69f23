//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! /unstable handler:
//!     → retries.rs (attempt loop, linear backoff, exhaustion)
//!         → timeouts.rs (deadline per attempt)
//!             → simulation::UnstableOperation
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every attempt has a deadline
//! - Outcomes are values (`Result<T, OperationError>`), not panics
//! - Status codes are chosen by the HTTP layer, never here

pub mod backoff;
pub mod outcome;
pub mod retries;
pub mod timeouts;

pub use outcome::{Attempt, AttemptOutcome, OperationError, Outcome};
pub use retries::{execute, RetryExhausted, RetryPolicy};
pub use timeouts::with_timeout;
