//! Resolver orchestrating candidate rounds under a time budget

use std::time::Instant;

use async_trait::async_trait;
use futures::future::join_all;
use storefront_core_types::{ExecCtx, PageDriver};
use storefront_snapshot_store::DiagnosticCapture;
use tracing::{debug, info, warn};

use crate::errors::LocatorError;
use crate::check::{check_candidate, CandidateCheck};
use crate::types::*;

/// Locator trait
#[async_trait]
pub trait Locator: Send + Sync {
    /// Resolve `target` to a visible element, polling until the budget elapses
    async fn resolve(
        &self,
        ctx: &ExecCtx,
        page: &dyn PageDriver,
        target: &Target,
        opts: &ResolveOptions,
    ) -> Result<ResolutionResult, LocatorError>;

    /// Text of every match of the first candidate that has matches
    ///
    /// Returns an empty list when no candidate matched within the budget.
    async fn resolve_all_texts(
        &self,
        ctx: &ExecCtx,
        page: &dyn PageDriver,
        target: &Target,
        opts: &ResolveOptions,
    ) -> Result<Vec<String>, LocatorError>;
}

/// Default locator implementation
#[derive(Clone, Debug, Default)]
pub struct DefaultLocator {
    capture: DiagnosticCapture,
}

impl DefaultLocator {
    pub fn new(capture: DiagnosticCapture) -> Self {
        Self { capture }
    }

    pub fn capture(&self) -> &DiagnosticCapture {
        &self.capture
    }

    /// One pass over every candidate.
    async fn check_round(
        &self,
        page: &dyn PageDriver,
        target: &Target,
        opts: &ResolveOptions,
    ) -> (Vec<CandidateReport>, Option<ResolvedElement>) {
        let max = opts.max_checked_per_candidate;
        let checks: Vec<CandidateCheck> = match opts.mode {
            ResolveMode::Sequential => {
                let mut checks = Vec::with_capacity(target.candidates.len());
                for anchor in &target.candidates {
                    let check = check_candidate(page, anchor, &target.filter, max).await;
                    let matched = check.outcome.is_match();
                    checks.push(check);
                    if matched {
                        break;
                    }
                }
                checks
            }
            ResolveMode::Concurrent => {
                join_all(
                    target
                        .candidates
                        .iter()
                        .map(|anchor| check_candidate(page, anchor, &target.filter, max)),
                )
                .await
            }
        };

        let mut reports = Vec::with_capacity(checks.len());
        let mut found = None;
        for (candidate_index, check) in checks.into_iter().enumerate() {
            let anchor = target.candidates[candidate_index].clone();
            if found.is_none() {
                if let (CandidateOutcome::Matched { index }, Some(element)) =
                    (&check.outcome, check.element)
                {
                    found = Some(ResolvedElement {
                        element,
                        candidate_index,
                        match_index: *index,
                        anchor: anchor.clone(),
                    });
                }
            }
            debug!(target = %target.name, candidate = candidate_index, outcome = ?check.outcome, "candidate checked");
            reports.push(CandidateReport {
                index: candidate_index,
                anchor,
                outcome: check.outcome,
            });
        }
        (reports, found)
    }

    async fn collect_texts(&self, page: &dyn PageDriver, target: &Target) -> Option<Vec<String>> {
        for anchor in &target.candidates {
            let elements = match page.query_all(anchor).await {
                Ok(elements) if !elements.is_empty() => elements,
                Ok(_) => continue,
                Err(err) => {
                    debug!(anchor = %anchor, error = %err, "candidate query failed");
                    continue;
                }
            };
            let mut texts = Vec::with_capacity(elements.len());
            for element in &elements {
                if matches!(target.filter.accepts(element.as_ref()).await, Ok(true)) {
                    if let Ok(text) = element.text().await {
                        texts.push(text);
                    }
                }
            }
            if !texts.is_empty() {
                return Some(texts);
            }
        }
        None
    }

    /// Cancel-aware pause between rounds, never past `deadline`.
    async fn pause(
        &self,
        ctx: &ExecCtx,
        target: &Target,
        deadline: Instant,
        opts: &ResolveOptions,
    ) -> Result<(), LocatorError> {
        let pause = opts
            .poll_interval
            .min(deadline.saturating_duration_since(Instant::now()));
        tokio::select! {
            _ = ctx.cancel_token.cancelled() => Err(LocatorError::Interrupted(target.name.clone())),
            _ = tokio::time::sleep(pause) => Ok(()),
        }
    }
}

fn deadline_for(ctx: &ExecCtx, opts: &ResolveOptions, started: Instant) -> Instant {
    (started + opts.budget).min(ctx.deadline)
}

#[async_trait]
impl Locator for DefaultLocator {
    async fn resolve(
        &self,
        ctx: &ExecCtx,
        page: &dyn PageDriver,
        target: &Target,
        opts: &ResolveOptions,
    ) -> Result<ResolutionResult, LocatorError> {
        target.validate()?;
        let started = Instant::now();
        let deadline = deadline_for(ctx, opts, started);
        let mut last_round: Option<Vec<CandidateReport>> = None;
        let mut rounds = 0u32;

        loop {
            if ctx.is_cancelled() {
                return Err(LocatorError::Interrupted(target.name.clone()));
            }
            let round = tokio::select! {
                biased;
                _ = ctx.cancel_token.cancelled() => {
                    return Err(LocatorError::Interrupted(target.name.clone()));
                }
                round = tokio::time::timeout_at(
                    tokio::time::Instant::from_std(deadline),
                    self.check_round(page, target, opts),
                ) => round,
            };

            match round {
                Ok((_, Some(resolved))) => {
                    info!(
                        action_id = %ctx.action_id,
                        target = %target.name,
                        candidate = resolved.candidate_index,
                        anchor = %resolved.anchor,
                        rounds = rounds + 1,
                        "target resolved"
                    );
                    return Ok(ResolutionResult::Found(resolved));
                }
                Ok((reports, None)) => {
                    rounds += 1;
                    last_round = Some(reports);
                }
                Err(_) => break,
            }

            if Instant::now() >= deadline {
                break;
            }
            self.pause(ctx, target, deadline, opts).await?;
        }

        let diagnostics = if opts.capture_on_miss {
            self.capture.capture(page, &target.slug).await
        } else {
            Vec::new()
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match last_round {
            Some(tried) => {
                warn!(
                    action_id = %ctx.action_id,
                    target = %target.name,
                    rounds,
                    elapsed_ms,
                    tried = %tried.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "),
                    "target not found"
                );
                Ok(ResolutionResult::NotFound { tried, diagnostics })
            }
            None => {
                warn!(
                    action_id = %ctx.action_id,
                    target = %target.name,
                    elapsed_ms,
                    "page never settled within the resolution budget"
                );
                Err(LocatorError::ResolutionTimeout {
                    target: target.name.clone(),
                    elapsed_ms,
                    diagnostics,
                })
            }
        }
    }

    async fn resolve_all_texts(
        &self,
        ctx: &ExecCtx,
        page: &dyn PageDriver,
        target: &Target,
        opts: &ResolveOptions,
    ) -> Result<Vec<String>, LocatorError> {
        target.validate()?;
        let started = Instant::now();
        let deadline = deadline_for(ctx, opts, started);
        let mut completed_round = false;

        loop {
            let round = tokio::select! {
                biased;
                _ = ctx.cancel_token.cancelled() => {
                    return Err(LocatorError::Interrupted(target.name.clone()));
                }
                round = tokio::time::timeout_at(
                    tokio::time::Instant::from_std(deadline),
                    self.collect_texts(page, target),
                ) => round,
            };

            match round {
                Ok(Some(texts)) => return Ok(texts),
                Ok(None) => completed_round = true,
                Err(_) => break,
            }
            if Instant::now() >= deadline {
                break;
            }
            self.pause(ctx, target, deadline, opts).await?;
        }

        if completed_round {
            debug!(target = %target.name, "no candidate produced any text");
            Ok(Vec::new())
        } else {
            Err(LocatorError::ResolutionTimeout {
                target: target.name.clone(),
                elapsed_ms: started.elapsed().as_millis() as u64,
                diagnostics: Vec::new(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom_fixture::{FakePage, Node};
    use std::time::Duration;
    use storefront_core_types::AnchorDescriptor;
    use storefront_snapshot_store::CapturePolicy;

    fn swatches() -> FakePage {
        FakePage::new(
            Node::new("div")
                .child(Node::new("button").class("swatch").text("Red").hidden())
                .child(Node::new("button").class("swatch").text("Blue"))
                .child(Node::new("button").class("color").text("Green")),
        )
    }

    fn quick() -> ResolveOptions {
        ResolveOptions::default()
            .with_budget(Duration::from_millis(150))
            .with_poll_interval(Duration::from_millis(20))
    }

    #[tokio::test]
    async fn earliest_candidate_wins_and_hidden_matches_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let locator = DefaultLocator::new(DiagnosticCapture::new(CapturePolicy::at(dir.path())));
        let page = swatches();
        let ctx = ExecCtx::with_budget(Duration::from_secs(5));
        let target = Target::new("swatch")
            .candidate(AnchorDescriptor::xpath("//button"))
            .css_candidates(["button.swatch", "button.color"]);

        let found = locator
            .resolve(&ctx, &page, &target, &quick())
            .await
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(found.candidate_index, 1);
        assert_eq!(found.match_index, 1);
        assert_eq!(found.element.text().await.unwrap(), "Blue");
    }

    #[tokio::test]
    async fn concurrent_mode_keeps_sequential_precedence() {
        let locator = DefaultLocator::default();
        let page = swatches();
        let ctx = ExecCtx::with_budget(Duration::from_secs(5));
        let target = Target::new("swatch").css_candidates(["button.color", "button.swatch"]);
        let result = locator
            .resolve(
                &ctx,
                &page,
                &target,
                &quick().with_mode(ResolveMode::Concurrent).without_capture(),
            )
            .await
            .unwrap();
        assert_eq!(result.candidate_index(), Some(0));
    }

    #[tokio::test]
    async fn cancellation_is_not_a_miss() {
        let locator = DefaultLocator::default();
        let page = swatches();
        let ctx = ExecCtx::with_budget(Duration::from_secs(5));
        ctx.cancel_token.cancel();
        let target = Target::new("missing").css_candidates(["select"]);
        let err = locator
            .resolve(&ctx, &page, &target, &quick().without_capture())
            .await
            .unwrap_err();
        assert!(matches!(err, LocatorError::Interrupted(_)));
    }

    #[tokio::test]
    async fn all_texts_come_from_the_first_candidate_with_matches() {
        let locator = DefaultLocator::default();
        let page = swatches();
        let ctx = ExecCtx::with_budget(Duration::from_secs(5));
        let target = Target::new("labels").css_candidates(["ul li", "button.swatch", "button"]);
        let texts = locator
            .resolve_all_texts(&ctx, &page, &target, &quick())
            .await
            .unwrap();
        assert_eq!(texts, vec!["Red", "Blue"]);
    }
}
