//! Scenario and run reports

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::SuiteError;
use crate::scenario::checks::CheckRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    TimedOut,
    Skipped,
}

impl ScenarioStatus {
    pub fn is_failure(self) -> bool {
        matches!(self, ScenarioStatus::Failed | ScenarioStatus::TimedOut)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    pub feature: String,
    pub tags: Vec<String>,
    pub status: ScenarioStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub checks: Vec<CheckRecord>,
    pub console_errors: usize,
    pub diagnostics: Vec<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl ScenarioReport {
    pub fn skipped(name: &str, feature: &str, tags: &[String]) -> Self {
        Self {
            name: name.to_string(),
            feature: feature.to_string(),
            tags: tags.to_vec(),
            status: ScenarioStatus::Skipped,
            error: None,
            checks: Vec::new(),
            console_errors: 0,
            diagnostics: Vec::new(),
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }

    pub fn soft_failures(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub browser: String,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub scenarios: Vec<ScenarioReport>,
}

impl RunReport {
    pub fn new(
        browser: &str,
        started_at: DateTime<Utc>,
        scenarios: Vec<ScenarioReport>,
    ) -> Self {
        let finished_at = Utc::now();
        let count = |pred: fn(&ScenarioReport) -> bool| scenarios.iter().filter(|s| pred(s)).count();
        Self {
            started_at,
            finished_at,
            duration_ms: (finished_at - started_at).num_milliseconds().max(0) as u64,
            browser: browser.to_string(),
            passed: count(|s| s.status == ScenarioStatus::Passed),
            failed: count(|s| s.status.is_failure()),
            skipped: count(|s| s.status == ScenarioStatus::Skipped),
            scenarios,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }

    /// Write the report as pretty JSON, replacing the file atomically.
    pub async fn write(&self, path: &Path) -> Result<(), SuiteError> {
        let json = serde_json::to_vec_pretty(self)
            .map_err(|err| SuiteError::Report(err.to_string()))?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| SuiteError::Report(format!("{}: {}", parent.display(), err)))?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|err| SuiteError::Report(format!("{}: {}", tmp.display(), err)))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|err| SuiteError::Report(format!("{}: {}", path.display(), err)))
    }

    /// Console summary, one line per executed scenario.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for scenario in self.scenarios.iter().filter(|s| s.status != ScenarioStatus::Skipped) {
            let mark = match scenario.status {
                ScenarioStatus::Passed => "PASS",
                ScenarioStatus::Failed => "FAIL",
                ScenarioStatus::TimedOut => "TIME",
                ScenarioStatus::Skipped => "SKIP",
            };
            out.push_str(&format!(
                "{} {} :: {} ({}ms)",
                mark, scenario.feature, scenario.name, scenario.duration_ms
            ));
            let soft = scenario.soft_failures();
            if soft > 0 {
                out.push_str(&format!(" [{} soft check(s) failed]", soft));
            }
            if let Some(error) = &scenario.error {
                out.push_str(&format!("\n     {}", error));
            }
            out.push('\n');
        }
        out.push_str(&format!(
            "{} passed, {} failed, {} skipped in {}ms",
            self.passed, self.failed, self.skipped, self.duration_ms
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(name: &str, status: ScenarioStatus) -> ScenarioReport {
        ScenarioReport {
            status,
            error: status.is_failure().then(|| "boom".to_string()),
            ..ScenarioReport::skipped(name, "Cart", &[])
        }
    }

    #[tokio::test]
    async fn counts_and_round_trips_to_disk() {
        let report = RunReport::new(
            "fixture",
            Utc::now(),
            vec![
                scenario("a", ScenarioStatus::Passed),
                scenario("b", ScenarioStatus::TimedOut),
                scenario("c", ScenarioStatus::Skipped),
            ],
        );
        assert_eq!((report.passed, report.failed, report.skipped), (1, 1, 1));
        assert!(!report.success());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/run-report.json");
        report.write(&path).await.unwrap();
        let back: RunReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, report);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn summary_lists_failures_with_their_error() {
        let report = RunReport::new(
            "fixture",
            Utc::now(),
            vec![scenario("remove item", ScenarioStatus::Failed)],
        );
        let summary = report.summary();
        assert!(summary.contains("FAIL Cart :: remove item"));
        assert!(summary.contains("     boom"));
        assert!(summary.ends_with(&format!("0 passed, 1 failed, 0 skipped in {}ms", report.duration_ms)));
    }
}
