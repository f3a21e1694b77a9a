use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by a page driver backend.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DriverError {
    /// The selector could not be parsed or is not supported by the backend
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// Element reference was invalidated by a re-render or navigation
    #[error("Stale element: {0}")]
    StaleElement(String),

    /// Element exists but cannot receive the interaction
    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    /// Page or browser already closed
    #[error("Page closed: {0}")]
    Closed(String),

    /// Backend call exceeded its own timeout
    #[error("Driver timeout: {0}")]
    Timeout(String),

    /// Protocol/transport failure
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Operation not supported by this backend
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl DriverError {
    /// Conditions that may clear up on their own between attempts.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DriverError::StaleElement(_)
                | DriverError::NotInteractable(_)
                | DriverError::Timeout(_)
                | DriverError::Protocol(_)
        )
    }
}
