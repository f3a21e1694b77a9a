use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::{ActionId, ScenarioId};

/// Execution context threaded through every resolve/act call.
///
/// Carries the scenario the call belongs to, a hard deadline (the outer
/// step ceiling) and a cancellation token owned by the scenario harness.
#[derive(Clone, Debug)]
pub struct ExecCtx {
    /// Scenario this call runs under
    pub scenario: ScenarioId,

    /// Unique identifier for this action
    pub action_id: ActionId,

    /// Deadline for this operation
    pub deadline: Instant,

    /// Cancellation token for cooperative cancellation
    pub cancel_token: CancellationToken,
}

impl ExecCtx {
    pub fn new(scenario: ScenarioId, deadline: Instant, cancel_token: CancellationToken) -> Self {
        Self {
            scenario,
            action_id: ActionId::new(),
            deadline,
            cancel_token,
        }
    }

    /// Context with a fresh scenario id, `budget` from now and its own token.
    pub fn with_budget(budget: Duration) -> Self {
        Self::new(
            ScenarioId::new(),
            Instant::now() + budget,
            CancellationToken::new(),
        )
    }

    /// Derive a context for a nested operation.
    ///
    /// The child is cancelled with the parent and never outlives its deadline.
    pub fn child(&self, budget: Duration) -> Self {
        let deadline = (Instant::now() + budget).min(self.deadline);
        Self {
            scenario: self.scenario.clone(),
            action_id: ActionId::new(),
            deadline,
            cancel_token: self.cancel_token.child_token(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    pub fn is_timeout(&self) -> bool {
        Instant::now() >= self.deadline
    }

    pub fn remaining_time(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_never_outlives_parent() {
        let parent = ExecCtx::with_budget(Duration::from_millis(50));
        let child = parent.child(Duration::from_secs(60));
        assert!(child.deadline <= parent.deadline);
        assert_eq!(child.scenario, parent.scenario);
        assert_ne!(child.action_id, parent.action_id);
    }

    #[test]
    fn parent_cancellation_reaches_child() {
        let parent = ExecCtx::with_budget(Duration::from_secs(5));
        let child = parent.child(Duration::from_secs(1));
        parent.cancel_token.cancel();
        assert!(child.is_cancelled());
    }
}
