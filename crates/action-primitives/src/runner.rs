//! Retry loop: resolve -> check -> scroll -> act -> verify

use std::sync::Arc;
use std::time::{Duration, Instant};

use action_locator::{Locator, LocatorError, ResolutionResult, ResolveOptions};
use storefront_core_types::{ElementHandle, ExecCtx, PageDriver};
use storefront_snapshot_store::DiagnosticCapture;
use tracing::{debug, error, info, warn};

use crate::errors::{ActionError, AttemptError};
use crate::post::{classify_read_back, FieldConstraints, PostCondition, ReadBack, Verdict};
use crate::types::{ActionOutcome, Step};

const POST_POLL_INTERVAL: Duration = Duration::from_millis(50);

enum AttemptFailure {
    Failed(AttemptError),
    Abort(ActionError),
}

impl From<storefront_core_types::DriverError> for AttemptFailure {
    fn from(err: storefront_core_types::DriverError) -> Self {
        AttemptFailure::Failed(AttemptError::Driver(err))
    }
}

/// Runs [`Step`]s against a page with bounded retries.
#[derive(Clone)]
pub struct ActionRunner {
    locator: Arc<dyn Locator>,
    capture: DiagnosticCapture,
    resolve: ResolveOptions,
}

impl ActionRunner {
    pub fn new(locator: Arc<dyn Locator>, capture: DiagnosticCapture) -> Self {
        Self {
            locator,
            capture,
            resolve: ResolveOptions::default(),
        }
    }

    /// Template for per-attempt resolution; the budget is replaced by the
    /// step's per-attempt timeout.
    pub fn with_resolve_options(mut self, opts: ResolveOptions) -> Self {
        self.resolve = opts;
        self
    }

    /// Run `step` until it succeeds, fails terminally, or attempts run out.
    ///
    /// Exhausted retries are an `Ok(ActionOutcome::Failure)`; `Err` is
    /// reserved for invalid configuration and cancellation.
    pub async fn run(
        &self,
        ctx: &ExecCtx,
        page: &dyn PageDriver,
        step: &Step,
    ) -> Result<ActionOutcome, ActionError> {
        step.policy.validate()?;
        step.target
            .validate()
            .map_err(|err| ActionError::InvalidTarget(err.to_string()))?;

        let started = Instant::now();
        let max_attempts = step.policy.max_attempts;
        let mut last_error = None;
        let mut attempts_used = 0;

        info!(
            action_id = %ctx.action_id,
            target = %step.target.name,
            action = step.action.name(),
            max_attempts,
            "Executing step"
        );

        for attempt in 1..=max_attempts {
            if ctx.is_cancelled() {
                return Err(ActionError::Interrupted(step.target.name.clone()));
            }
            attempts_used = attempt;

            match self.attempt(ctx, page, step).await {
                Ok(verdict) => {
                    let latency_ms = started.elapsed().as_millis() as u64;
                    info!(
                        action_id = %ctx.action_id,
                        target = %step.target.name,
                        attempt,
                        ?verdict,
                        latency_ms,
                        "Step completed"
                    );
                    return Ok(ActionOutcome::Success {
                        attempts_used: attempt,
                        verdict,
                        latency_ms,
                    });
                }
                Err(AttemptFailure::Abort(err)) => return Err(err),
                Err(AttemptFailure::Failed(err)) => {
                    let transient = err.is_transient();
                    warn!(
                        action_id = %ctx.action_id,
                        target = %step.target.name,
                        attempt,
                        max_attempts,
                        transient,
                        error = %err,
                        "Attempt failed"
                    );
                    last_error = Some(err);
                    if !transient {
                        break;
                    }
                    if attempt < max_attempts {
                        self.backoff(ctx, step, attempt).await?;
                    }
                }
            }
        }

        let Some(last_error) = last_error else {
            return Err(ActionError::InvalidPolicy(
                "no attempt was executed".to_string(),
            ));
        };
        let diagnostics = self.capture.capture(page, &step.slug).await;
        let diagnostics_path = diagnostics.first().map(|a| a.path.clone());
        let latency_ms = started.elapsed().as_millis() as u64;
        error!(
            action_id = %ctx.action_id,
            target = %step.target.name,
            attempts_used,
            error = %last_error,
            diagnostics = ?diagnostics_path,
            "Step failed"
        );
        Ok(ActionOutcome::Failure {
            attempts_used,
            last_error,
            diagnostics_path,
            latency_ms,
        })
    }

    async fn backoff(&self, ctx: &ExecCtx, step: &Step, attempt: u32) -> Result<(), ActionError> {
        let delay = step.policy.backoff.delay(attempt);
        debug!(action_id = %ctx.action_id, attempt, delay_ms = delay.as_millis() as u64, "Backing off");
        tokio::select! {
            _ = ctx.cancel_token.cancelled() => Err(ActionError::Interrupted(step.target.name.clone())),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    async fn attempt(
        &self,
        ctx: &ExecCtx,
        page: &dyn PageDriver,
        step: &Step,
    ) -> Result<Verdict, AttemptFailure> {
        let per_attempt = step.policy.per_attempt_timeout;

        // Fresh resolution every attempt; handles from earlier attempts may be stale.
        let resolve_ctx = ctx.child(per_attempt);
        let opts = self
            .resolve
            .clone()
            .with_budget(per_attempt)
            .without_capture();
        let resolved = match self
            .locator
            .resolve(&resolve_ctx, page, &step.target, &opts)
            .await
        {
            Ok(ResolutionResult::Found(resolved)) => resolved,
            Ok(ResolutionResult::NotFound { tried, .. }) => {
                return Err(AttemptFailure::Failed(AttemptError::NotResolved {
                    target: step.target.name.clone(),
                    tried: tried.iter().map(ToString::to_string).collect(),
                }))
            }
            Err(LocatorError::Interrupted(name)) => {
                return Err(AttemptFailure::Abort(ActionError::Interrupted(name)))
            }
            Err(LocatorError::ResolutionTimeout { target, .. }) => {
                return Err(AttemptFailure::Failed(AttemptError::ResolutionTimeout(
                    target,
                )))
            }
            Err(other) => {
                return Err(AttemptFailure::Abort(ActionError::InvalidTarget(
                    other.to_string(),
                )))
            }
        };
        let element = resolved.element;

        if !element.is_visible().await? {
            return Err(AttemptFailure::Failed(AttemptError::NotVisible(
                element.describe(),
            )));
        }
        if !element.is_enabled().await? {
            return Err(AttemptFailure::Failed(AttemptError::NotEnabled(
                element.describe(),
            )));
        }

        let constraints = match step.post {
            PostCondition::ValueEquals(_) => FieldConstraints::read(element.as_ref()).await,
            _ => FieldConstraints::default(),
        };

        element.scroll_into_view().await?;

        let deadline = Instant::now() + per_attempt;
        let performed = tokio::select! {
            biased;
            _ = ctx.cancel_token.cancelled() => {
                return Err(AttemptFailure::Abort(ActionError::Interrupted(step.target.name.clone())));
            }
            performed = tokio::time::timeout(per_attempt, step.action.perform(element.as_ref())) => performed,
        };
        match performed {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => {
                return Err(AttemptFailure::Failed(AttemptError::AttemptTimeout {
                    action: step.action.name().to_string(),
                    timeout_ms: per_attempt.as_millis() as u64,
                }))
            }
        }

        self.check_post(ctx, page, element.as_ref(), step, &constraints, deadline)
            .await
    }

    async fn check_post(
        &self,
        ctx: &ExecCtx,
        page: &dyn PageDriver,
        element: &dyn ElementHandle,
        step: &Step,
        constraints: &FieldConstraints,
        deadline: Instant,
    ) -> Result<Verdict, AttemptFailure> {
        match &step.post {
            PostCondition::None => Ok(Verdict::Completed),
            PostCondition::ValueEquals(expected) => {
                let observed = element.input_value().await?;
                let validation = element.validation_message().await.ok().flatten();
                match classify_read_back(expected, &observed, validation.as_deref(), constraints) {
                    ReadBack::Applied => Ok(Verdict::Applied),
                    ReadBack::Rejected { reason } => {
                        info!(
                            action_id = %ctx.action_id,
                            target = %step.target.name,
                            requested = %expected,
                            observed = %observed,
                            reason = %reason,
                            "Input rejected by the UI"
                        );
                        Ok(Verdict::RejectedByUi { observed, reason })
                    }
                    ReadBack::Unapplied => Err(AttemptFailure::Failed(
                        AttemptError::PostConditionUnmet(format!(
                            "expected value '{}', found '{}'",
                            expected, observed
                        )),
                    )),
                }
            }
            PostCondition::UrlMatches(pattern) => loop {
                let url = page.current_url().await?;
                if pattern.is_match(&url) {
                    return Ok(Verdict::ConditionMet);
                }
                if Instant::now() >= deadline {
                    return Err(AttemptFailure::Failed(AttemptError::PostConditionUnmet(
                        format!("url '{}' does not match /{}/", url, pattern.as_str()),
                    )));
                }
                self.poll_pause(ctx, step, deadline).await?;
            },
            PostCondition::TextContains(needle) => loop {
                let text = element.text().await?;
                if text.to_lowercase().contains(&needle.to_lowercase()) {
                    return Ok(Verdict::ConditionMet);
                }
                if Instant::now() >= deadline {
                    return Err(AttemptFailure::Failed(AttemptError::PostConditionUnmet(
                        format!("text '{}' does not contain '{}'", text, needle),
                    )));
                }
                self.poll_pause(ctx, step, deadline).await?;
            },
        }
    }

    async fn poll_pause(
        &self,
        ctx: &ExecCtx,
        step: &Step,
        deadline: Instant,
    ) -> Result<(), AttemptFailure> {
        let pause = POST_POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now()));
        tokio::select! {
            _ = ctx.cancel_token.cancelled() => Err(AttemptFailure::Abort(ActionError::Interrupted(step.target.name.clone()))),
            _ = tokio::time::sleep(pause) => Ok(()),
        }
    }
}
