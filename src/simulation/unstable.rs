//! The flaky operation behind `/unstable`.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::resilience::{OperationError, Outcome};
use crate::simulation::source::{Branch, OutcomeSource};

/// Body returned when the operation completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationPayload {
    pub status: &'static str,
    pub detail: &'static str,
}

/// Succeeds, fails, or stalls, as chosen by its [`OutcomeSource`].
///
/// Holds no per-call state, so one instance is shared by every request.
#[derive(Clone)]
pub struct UnstableOperation {
    source: Arc<dyn OutcomeSource>,
    slow_delay: Duration,
}

impl UnstableOperation {
    /// `slow_delay` must be longer than any timeout wrapped around `run`.
    pub fn new(source: Arc<dyn OutcomeSource>, slow_delay: Duration) -> Self {
        Self { source, slow_delay }
    }

    pub async fn run(&self) -> Outcome<OperationPayload> {
        let branch = self.source.pick();
        tracing::info!(endpoint = "/unstable", choice = %branch, "unstable choice");

        match branch {
            Branch::Success => Ok(OperationPayload {
                status: "ok",
                detail: "operation completed",
            }),
            Branch::Exception => Err(OperationError::transient("simulated transient failure")),
            Branch::Delay => {
                tokio::time::sleep(self.slow_delay).await;
                Ok(OperationPayload {
                    status: "ok",
                    detail: "delayed operation completed",
                })
            }
        }
    }
}

impl std::fmt::Debug for UnstableOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnstableOperation")
            .field("slow_delay", &self.slow_delay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::with_timeout;
    use crate::simulation::source::FixedOutcome;

    fn operation(branch: Branch) -> UnstableOperation {
        UnstableOperation::new(Arc::new(FixedOutcome(branch)), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_success_branch() {
        let payload = operation(Branch::Success).run().await.unwrap();
        assert_eq!(payload.status, "ok");
        assert_eq!(payload.detail, "operation completed");
    }

    #[tokio::test]
    async fn test_exception_branch_is_transient() {
        let err = operation(Branch::Exception).run().await.unwrap_err();
        assert_eq!(err, OperationError::Transient("simulated transient failure".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_branch_completes_without_deadline() {
        let payload = operation(Branch::Delay).run().await.unwrap();
        assert_eq!(payload.detail, "delayed operation completed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_branch_loses_race_against_timeout() {
        let op = operation(Branch::Delay);
        let outcome = with_timeout(Duration::from_secs(1), op.run()).await;
        assert_eq!(outcome, Err(OperationError::Timeout(Duration::from_secs(1))));
    }
}
