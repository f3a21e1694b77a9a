//! Error types for the locator

use storefront_snapshot_store::DiagnosticArtifact;
use thiserror::Error;

/// Locator error enumeration
///
/// A candidate that fails to match is not an error; it is reported through
/// [`crate::CandidateOutcome`]. These variants cover misconfiguration,
/// pages that never settle, and external cancellation.
#[derive(Debug, Error, Clone)]
pub enum LocatorError {
    /// Target configured without any selector candidate
    #[error("Empty candidate list for target '{0}'")]
    EmptyCandidateList(String),

    /// Target configured with an unusable candidate
    #[error("Invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Budget elapsed before a single probing round completed
    #[error("Resolution of '{target}' timed out after {elapsed_ms}ms without completing a probing round")]
    ResolutionTimeout {
        target: String,
        elapsed_ms: u64,
        diagnostics: Vec<DiagnosticArtifact>,
    },

    /// Execution context cancelled by the caller
    #[error("Resolution of '{0}' interrupted")]
    Interrupted(String),
}

impl LocatorError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, LocatorError::ResolutionTimeout { .. })
    }

    /// Get error severity (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            LocatorError::EmptyCandidateList(_) | LocatorError::InvalidTarget { .. } => 3,
            LocatorError::ResolutionTimeout { .. } => 2,
            LocatorError::Interrupted(_) => 1,
        }
    }

    pub fn diagnostics(&self) -> &[DiagnosticArtifact] {
        match self {
            LocatorError::ResolutionTimeout { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }
}
