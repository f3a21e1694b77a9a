//! Tag filtering and bounded-parallel suite execution

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::config::RunnerConfig;
use crate::scenario::catalog::{normalize_tag, Scenario};
use crate::scenario::harness::ScenarioHarness;
use crate::scenario::report::{RunReport, ScenarioReport};

/// Which scenarios of a catalog run.
///
/// A scenario runs when it carries one of `include_tags` (or the list is
/// empty), carries none of `exclude_tags`, and its name contains `name`.
/// Tags asked for explicitly are never excluded, so `--tag skip` runs the
/// scenarios the default configuration leaves out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunFilter {
    pub include_tags: Vec<String>,
    pub exclude_tags: Vec<String>,
    pub name: Option<String>,
}

impl RunFilter {
    pub fn from_config(runner: &RunnerConfig) -> Self {
        Self {
            exclude_tags: runner.exclude_tags.iter().map(|t| normalize_tag(t)).collect(),
            ..Self::default()
        }
    }

    pub fn include<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.include_tags
            .extend(tags.into_iter().map(|t| normalize_tag(t.as_ref())));
        self
    }

    pub fn exclude<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude_tags
            .extend(tags.into_iter().map(|t| normalize_tag(t.as_ref())));
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn matches(&self, scenario: &Scenario) -> bool {
        if let Some(name) = &self.name {
            if !scenario.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        let excluded = self
            .exclude_tags
            .iter()
            .filter(|tag| !self.include_tags.contains(tag))
            .any(|tag| scenario.has_tag(tag));
        if excluded {
            return false;
        }
        self.include_tags.is_empty() || self.include_tags.iter().any(|tag| scenario.has_tag(tag))
    }
}

/// Runs a catalog through a [`ScenarioHarness`], at most `parallel`
/// scenarios at a time.
pub struct SuiteRunner {
    harness: ScenarioHarness,
    parallel: usize,
}

impl SuiteRunner {
    pub fn new(harness: ScenarioHarness) -> Self {
        let parallel = harness.config().runner.parallel;
        Self {
            harness,
            parallel: parallel.max(1),
        }
    }

    pub fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel.max(1);
        self
    }

    /// Run every scenario `filter` selects. Filtered-out scenarios are
    /// reported as skipped; report order follows the catalog.
    pub async fn run(&self, scenarios: &[Scenario], filter: &RunFilter) -> RunReport {
        let started_at = Utc::now();
        let (selected, skipped): (Vec<_>, Vec<_>) = scenarios
            .iter()
            .enumerate()
            .partition(|(_, scenario)| filter.matches(scenario));
        info!(
            selected = selected.len(),
            skipped = skipped.len(),
            parallel = self.parallel,
            "Running scenarios"
        );

        let mut reports: Vec<(usize, ScenarioReport)> = skipped
            .into_iter()
            .map(|(index, scenario)| {
                debug!(scenario = %scenario.name, "filtered out");
                (
                    index,
                    ScenarioReport::skipped(&scenario.name, &scenario.feature, &scenario.tags),
                )
            })
            .collect();

        let harness = &self.harness;
        let ran: Vec<(usize, ScenarioReport)> = stream::iter(selected)
            .map(|(index, scenario)| async move { (index, harness.run(scenario).await) })
            .buffer_unordered(self.parallel)
            .collect()
            .await;
        reports.extend(ran);
        reports.sort_by_key(|(index, _)| *index);

        let report = RunReport::new(
            harness.browser_name(),
            started_at,
            reports.into_iter().map(|(_, report)| report).collect(),
        );
        info!(
            passed = report.passed,
            failed = report.failed,
            skipped = report.skipped,
            duration_ms = report.duration_ms,
            "Run finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    fn scenario(name: &str, tags: &[&str]) -> Scenario {
        Scenario::new(name, "feature", |_ctx| async { Ok(()) }.boxed()).with_tags(tags.iter().copied())
    }

    #[test]
    fn default_filter_drops_skip() {
        let filter = RunFilter::from_config(&RunnerConfig::default());
        assert!(filter.matches(&scenario("a", &["smoke"])));
        assert!(!filter.matches(&scenario("b", &["@skip"])));
    }

    #[test]
    fn explicit_tag_overrides_default_exclusion() {
        let filter = RunFilter::from_config(&RunnerConfig::default()).include(["skip"]);
        assert!(filter.matches(&scenario("b", &["skip"])));
        assert!(!filter.matches(&scenario("a", &["smoke"])));
    }

    #[test]
    fn name_filter_is_case_insensitive() {
        let filter = RunFilter::default().named("pd00");
        assert!(filter.matches(&scenario("PD001 - title", &[])));
        assert!(!filter.matches(&scenario("PR001 - crumbs", &[])));
    }

    #[test]
    fn cli_exclusion_adds_to_config() {
        let filter = RunFilter::from_config(&RunnerConfig::default()).exclude(["mail"]);
        assert!(!filter.matches(&scenario("m", &["mail"])));
        assert!(!filter.matches(&scenario("s", &["skip"])));
    }
}
