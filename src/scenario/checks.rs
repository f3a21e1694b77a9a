//! Soft and hard assertions recorded per scenario

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::SuiteError;

/// Whether a failed check stops the scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckMode {
    /// Logged and reported, the scenario carries on
    Soft,
    /// Fails the scenario
    Hard,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub name: String,
    pub mode: CheckMode,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct CheckLog {
    records: Mutex<Vec<CheckRecord>>,
}

impl CheckLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a check outcome. Only a failed hard check is an error.
    pub fn record(
        &self,
        scenario: &str,
        name: &str,
        mode: CheckMode,
        passed: bool,
        detail: Option<String>,
    ) -> Result<(), SuiteError> {
        if passed {
            info!(scenario, check = name, "check passed");
        } else {
            warn!(scenario, check = name, ?mode, detail = ?detail, "check failed");
        }
        let failure = (!passed && mode == CheckMode::Hard).then(|| match &detail {
            Some(detail) => format!("{}: {}", name, detail),
            None => name.to_string(),
        });
        self.records.lock().push(CheckRecord {
            name: name.to_string(),
            mode,
            passed,
            detail,
            at: Utc::now(),
        });
        match failure {
            Some(message) => Err(SuiteError::Check(message)),
            None => Ok(()),
        }
    }

    pub fn records(&self) -> Vec<CheckRecord> {
        self.records.lock().clone()
    }

    pub fn soft_failures(&self) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|r| !r.passed && r.mode == CheckMode::Soft)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_failures_are_kept_and_do_not_error() {
        let log = CheckLog::new();
        assert!(log
            .record("pdp", "images present", CheckMode::Soft, false, Some("0 images".into()))
            .is_ok());
        assert!(log.record("pdp", "title", CheckMode::Hard, true, None).is_ok());
        assert_eq!(log.soft_failures(), 1);
        assert_eq!(log.records().len(), 2);
    }

    #[test]
    fn hard_failure_is_a_check_error() {
        let log = CheckLog::new();
        let err = log
            .record("pdp", "title", CheckMode::Hard, false, Some("was 'Tee'".into()))
            .unwrap_err();
        assert_eq!(err.to_string(), "check failed: title: was 'Tee'");
        assert!(!log.records()[0].passed);
    }
}
