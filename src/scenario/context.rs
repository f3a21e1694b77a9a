//! Per-scenario context handed to scenario bodies and page objects

use std::sync::Arc;
use std::time::Duration;

use action_locator::{
    DefaultLocator, Locator, ResolutionResult, ResolveOptions, ResolvedElement, Target,
};
use action_primitives::{
    wait_for, ActionOutcome, ActionRunner, RetryPolicy, Step, Verdict, WaitCondition,
};
use storefront_core_types::{DriverError, ExecCtx, PageDriver, PageRef};
use storefront_snapshot_store::{DiagnosticArtifact, DiagnosticCapture};
use tracing::{debug, warn};

use crate::config::SuiteConfig;
use crate::errors::SuiteError;
use crate::scenario::checks::{CheckLog, CheckMode};
use crate::services::result_log::{ResultLog, ResultRow};

/// Everything one scenario may touch: its own page, the resolver and
/// retrier, the suite configuration, and its check log.
///
/// Created by the harness for a single scenario and never shared with
/// another one.
pub struct ScenarioContext {
    name: String,
    page: PageRef,
    exec: ExecCtx,
    locator: Arc<dyn Locator>,
    runner: ActionRunner,
    capture: DiagnosticCapture,
    config: Arc<SuiteConfig>,
    checks: CheckLog,
    results: Option<Arc<ResultLog>>,
}

impl ScenarioContext {
    pub fn new(
        name: impl Into<String>,
        page: PageRef,
        config: Arc<SuiteConfig>,
        exec: ExecCtx,
    ) -> Self {
        let capture = DiagnosticCapture::new(config.artifacts.capture_policy());
        let locator: Arc<dyn Locator> = Arc::new(DefaultLocator::new(capture.clone()));
        let runner = ActionRunner::new(Arc::clone(&locator), capture.clone())
            .with_resolve_options(config.timeouts.resolve_options());
        Self {
            name: name.into(),
            page,
            exec,
            locator,
            runner,
            capture,
            config,
            checks: CheckLog::new(),
            results: None,
        }
    }

    pub fn with_result_log(mut self, results: Arc<ResultLog>) -> Self {
        self.results = Some(results);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn page(&self) -> &dyn PageDriver {
        self.page.as_ref()
    }

    pub fn exec(&self) -> &ExecCtx {
        &self.exec
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn checks(&self) -> &CheckLog {
        &self.checks
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        self.config.timeouts.resolve_options()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.config.retry.policy()
    }

    fn interrupted(&self) -> SuiteError {
        SuiteError::Action(action_primitives::ActionError::Interrupted(
            self.name.clone(),
        ))
    }

    /// Navigate, bounded by the navigation timeout.
    pub async fn goto(&self, url: &str) -> Result<(), SuiteError> {
        if self.exec.is_cancelled() {
            return Err(self.interrupted());
        }
        let timeout = self.config.timeouts.navigation();
        debug!(scenario = %self.name, url, "navigating");
        tokio::select! {
            biased;
            _ = self.exec.cancel_token.cancelled() => Err(self.interrupted()),
            result = tokio::time::timeout(timeout, self.page.goto(url)) => match result {
                Ok(result) => result.map_err(SuiteError::from),
                Err(_) => Err(SuiteError::Driver(DriverError::Timeout(format!(
                    "navigation to {} exceeded {}ms",
                    url,
                    timeout.as_millis()
                )))),
            },
        }
    }

    pub async fn current_url(&self) -> Result<String, SuiteError> {
        Ok(self.page.current_url().await?)
    }

    pub async fn title(&self) -> Result<String, SuiteError> {
        Ok(self.page.title().await?)
    }

    pub async fn resolve(&self, target: &Target) -> Result<ResolutionResult, SuiteError> {
        self.resolve_with(target, &self.resolve_options()).await
    }

    pub async fn resolve_with(
        &self,
        target: &Target,
        opts: &ResolveOptions,
    ) -> Result<ResolutionResult, SuiteError> {
        Ok(self
            .locator
            .resolve(&self.exec, self.page.as_ref(), target, opts)
            .await?)
    }

    /// Resolve without treating a miss as an error.
    pub async fn find(&self, target: &Target) -> Result<Option<ResolvedElement>, SuiteError> {
        Ok(self.resolve(target).await?.found())
    }

    /// Resolve, failing the caller when no candidate matches.
    pub async fn require(&self, target: &Target) -> Result<ResolvedElement, SuiteError> {
        match self.resolve(target).await? {
            ResolutionResult::Found(resolved) => Ok(resolved),
            ResolutionResult::NotFound { tried, diagnostics } => {
                Err(SuiteError::TargetNotFound {
                    target: target.name.clone(),
                    tried: tried.iter().map(ToString::to_string).collect(),
                    diagnostics: diagnostics.first().map(|a| a.path.clone()),
                })
            }
        }
    }

    /// Text of every match of the first candidate with matches.
    pub async fn texts(&self, target: &Target) -> Result<Vec<String>, SuiteError> {
        Ok(self
            .locator
            .resolve_all_texts(&self.exec, self.page.as_ref(), target, &self.resolve_options())
            .await?)
    }

    /// Run a step and hand back its outcome, failed or not.
    pub async fn step(&self, step: Step) -> Result<ActionOutcome, SuiteError> {
        Ok(self.runner.run(&self.exec, self.page.as_ref(), &step).await?)
    }

    /// Run a step; exhausted retries become [`SuiteError::StepFailed`].
    pub async fn perform(&self, step: Step) -> Result<Verdict, SuiteError> {
        let target = step.target.name.clone();
        match self.step(step).await? {
            ActionOutcome::Success { verdict, .. } => Ok(verdict),
            ActionOutcome::Failure {
                attempts_used,
                last_error,
                diagnostics_path,
                ..
            } => Err(SuiteError::StepFailed {
                target,
                attempts: attempts_used,
                error: last_error,
                diagnostics: diagnostics_path,
            }),
        }
    }

    pub async fn click(&self, target: Target) -> Result<Verdict, SuiteError> {
        self.perform(Step::click(target).with_policy(self.retry_policy()))
            .await
    }

    /// Fill and read back; a value the UI refuses comes back as
    /// [`Verdict::RejectedByUi`].
    pub async fn fill(&self, target: Target, value: &str) -> Result<Verdict, SuiteError> {
        self.perform(Step::fill(target, value).with_policy(self.retry_policy()))
            .await
    }

    pub async fn hover(&self, target: Target) -> Result<Verdict, SuiteError> {
        self.perform(Step::hover(target).with_policy(self.retry_policy()))
            .await
    }

    pub async fn select(&self, target: Target, value: &str) -> Result<Verdict, SuiteError> {
        self.perform(Step::select(target, value).with_policy(self.retry_policy()))
            .await
    }

    pub async fn wait(&self, condition: &WaitCondition, timeout: Duration) -> Result<(), SuiteError> {
        Ok(wait_for(&self.exec, self.page.as_ref(), condition, timeout).await?)
    }

    pub fn check(
        &self,
        name: &str,
        mode: CheckMode,
        passed: bool,
        detail: Option<String>,
    ) -> Result<(), SuiteError> {
        self.checks.record(&self.name, name, mode, passed, detail)
    }

    pub fn soft_check(&self, name: &str, passed: bool, detail: Option<String>) {
        // Soft checks never error.
        let _ = self.check(name, CheckMode::Soft, passed, detail);
    }

    pub fn hard_check(
        &self,
        name: &str,
        passed: bool,
        detail: Option<String>,
    ) -> Result<(), SuiteError> {
        self.check(name, CheckMode::Hard, passed, detail)
    }

    pub async fn capture(&self, slug: &str) -> Vec<DiagnosticArtifact> {
        self.capture.capture(self.page.as_ref(), slug).await
    }

    /// Append a row to the result log when one is attached.
    pub async fn log_result(&self, sheet: &str, row: ResultRow) {
        let Some(results) = &self.results else {
            debug!(scenario = %self.name, sheet, id = %row.id, "no result log attached");
            return;
        };
        if let Err(err) = results.append(sheet, &row).await {
            warn!(scenario = %self.name, sheet, id = %row.id, error = %err, "result row lost");
        }
    }
}
