use std::path::PathBuf;

use action_locator::LocatorError;
use action_primitives::{ActionError, AttemptError};
use storefront_core_types::DriverError;
use thiserror::Error;

/// Suite-level failures.
#[derive(Debug, Error)]
pub enum SuiteError {
    /// A third-party service (mail inbox, PageSpeed) misbehaved
    #[error("{service} failed: {message}")]
    ExternalService {
        service: &'static str,
        message: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("report error: {0}")]
    Report(String),

    /// No selector candidate produced a usable element
    #[error("'{target}' not found (tried: {})", .tried.join("; "))]
    TargetNotFound {
        target: String,
        tried: Vec<String>,
        diagnostics: Option<PathBuf>,
    },

    /// A step exhausted its retries
    #[error("step on '{target}' failed after {attempts} attempt(s): {error}")]
    StepFailed {
        target: String,
        attempts: u32,
        error: AttemptError,
        diagnostics: Option<PathBuf>,
    },

    /// A hard check failed
    #[error("check failed: {0}")]
    Check(String),

    #[error(transparent)]
    Locator(#[from] LocatorError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl SuiteError {
    pub fn external(service: &'static str, message: impl Into<String>) -> Self {
        SuiteError::ExternalService {
            service,
            message: message.into(),
        }
    }

    /// Diagnostic artifact attached to the failure, if any
    pub fn diagnostics(&self) -> Option<&PathBuf> {
        match self {
            SuiteError::TargetNotFound { diagnostics, .. }
            | SuiteError::StepFailed { diagnostics, .. } => diagnostics.as_ref(),
            _ => None,
        }
    }

    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            SuiteError::ExternalService { .. } => true,
            SuiteError::Locator(err) => err.is_retryable(),
            SuiteError::Action(err) => err.is_retryable(),
            SuiteError::Driver(err) => err.is_transient(),
            SuiteError::StepFailed { error, .. } => error.is_transient(),
            SuiteError::TargetNotFound { .. }
            | SuiteError::Config(_)
            | SuiteError::Report(_)
            | SuiteError::Check(_) => false,
        }
    }

    /// Get error severity (0-3, higher is more severe)
    pub fn severity(&self) -> u8 {
        match self {
            SuiteError::Check(_) => 1,
            SuiteError::ExternalService { .. }
            | SuiteError::Report(_)
            | SuiteError::TargetNotFound { .. }
            | SuiteError::StepFailed { .. } => 2,
            SuiteError::Config(_) => 3,
            SuiteError::Locator(err) => err.severity(),
            SuiteError::Action(err) => err.severity(),
            SuiteError::Driver(err) if err.is_transient() => 1,
            SuiteError::Driver(_) => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_service_names_the_service() {
        let err = SuiteError::external("mailinator", "inbox never loaded");
        assert_eq!(err.to_string(), "mailinator failed: inbox never loaded");
        assert!(err.is_retryable());
        assert_eq!(err.severity(), 2);
    }

    #[test]
    fn step_failure_keeps_its_diagnostics() {
        let err = SuiteError::StepFailed {
            target: "add to cart".into(),
            attempts: 3,
            error: AttemptError::NotVisible("button#add".into()),
            diagnostics: Some(PathBuf::from("results/artifacts/add-to-cart.png")),
        };
        assert_eq!(
            err.to_string(),
            "step on 'add to cart' failed after 3 attempt(s): button#add is not visible"
        );
        assert!(err.diagnostics().is_some());
    }

    #[test]
    fn config_errors_are_fatal() {
        let err = SuiteError::Config("bad ttl".into());
        assert!(!err.is_retryable());
        assert_eq!(err.severity(), 3);
    }
}
