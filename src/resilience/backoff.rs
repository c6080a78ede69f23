//! Linear backoff between retry attempts.

use std::time::Duration;

/// Delay to wait after failed attempt `attempt` (1-based) before the next one.
///
/// Grows linearly: `base * attempt`. The wait before attempt *i* is therefore
/// `base * (i - 1)`.
pub fn linear_backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(attempt)
}
