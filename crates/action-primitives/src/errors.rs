//! Error types for the action retrier

use serde::{Deserialize, Serialize};
use storefront_core_types::DriverError;
use thiserror::Error;

/// Errors returned instead of an outcome.
///
/// Only misconfiguration, cancellation and condition waits produce these;
/// exhausted retries are reported as [`crate::ActionOutcome::Failure`].
#[derive(Debug, Error, Clone)]
pub enum ActionError {
    /// Retry policy violates its invariants
    #[error("Invalid retry policy: {0}")]
    InvalidPolicy(String),

    /// Target has no usable candidates
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// Operation was cancelled or interrupted
    #[error("Operation interrupted: {0}")]
    Interrupted(String),

    /// Wait operation timed out
    #[error("Wait timeout: {0}")]
    WaitTimeout(String),

    /// Non-recoverable driver failure during a wait
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

impl ActionError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            ActionError::WaitTimeout(_) => true,
            ActionError::Driver(err) => err.is_transient(),
            _ => false,
        }
    }

    /// Get error severity level (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            ActionError::InvalidPolicy(_) | ActionError::InvalidTarget(_) => 3,
            ActionError::Driver(_) => 2,
            ActionError::WaitTimeout(_) => 1,
            ActionError::Interrupted(_) => 0,
        }
    }
}

/// Why a single attempt did not succeed.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptError {
    /// No candidate produced a usable element
    #[error("'{target}' not found (tried: {})", .tried.join("; "))]
    NotResolved { target: String, tried: Vec<String> },

    /// Page never settled during resolution
    #[error("resolution of '{0}' timed out")]
    ResolutionTimeout(String),

    #[error("{0} is not visible")]
    NotVisible(String),

    #[error("{0} is not enabled")]
    NotEnabled(String),

    #[error("{0}")]
    Driver(DriverError),

    /// Action did not complete within the per-attempt timeout
    #[error("{action} did not complete within {timeout_ms}ms")]
    AttemptTimeout { action: String, timeout_ms: u64 },

    #[error("post-condition not met: {0}")]
    PostConditionUnmet(String),
}

impl AttemptError {
    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AttemptError::Driver(err) => err.is_transient(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_page_is_not_worth_another_attempt() {
        assert!(!AttemptError::Driver(DriverError::Closed("tab".into())).is_transient());
        assert!(AttemptError::Driver(DriverError::StaleElement("li".into())).is_transient());
        assert!(AttemptError::NotEnabled("<button>".into()).is_transient());
    }

    #[test]
    fn not_resolved_lists_every_candidate() {
        let err = AttemptError::NotResolved {
            target: "add to cart".into(),
            tried: vec!["#0 css:#add -> no matches".into(), "#1 text:partial:'Add' -> no matches".into()],
        };
        assert!(err.to_string().contains("#1 text:partial:'Add'"));
    }
}
