//! Per-scenario setup and guaranteed teardown

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::FutureExt;
use storefront_core_types::{BrowserFactory, ExecCtx, PageRef, ScenarioId};
use storefront_snapshot_store::slugify;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::SuiteConfig;
use crate::scenario::catalog::Scenario;
use crate::scenario::context::ScenarioContext;
use crate::scenario::report::{ScenarioReport, ScenarioStatus};
use crate::services::result_log::ResultLog;

/// Closes the page exactly once, on the explicit path or on drop.
struct PageGuard {
    page: PageRef,
    closed: AtomicBool,
}

impl PageGuard {
    fn new(page: PageRef) -> Self {
        Self {
            page,
            closed: AtomicBool::new(false),
        }
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(err) = self.page.close().await {
            warn!(error = %err, "page close failed");
        }
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let page = Arc::clone(&self.page);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(err) = page.close().await {
                    warn!(error = %err, "page close on drop failed");
                }
            });
        }
    }
}

/// Runs scenarios one page each.
///
/// Every scenario gets a fresh page from the browser factory and its own
/// [`ScenarioContext`]; the page is closed whatever the body does, including
/// panics and the scenario ceiling firing.
#[derive(Clone)]
pub struct ScenarioHarness {
    browser: Arc<dyn BrowserFactory>,
    config: Arc<SuiteConfig>,
    results: Option<Arc<ResultLog>>,
}

impl ScenarioHarness {
    pub fn new(browser: Arc<dyn BrowserFactory>, config: Arc<SuiteConfig>) -> Self {
        Self {
            browser,
            config,
            results: None,
        }
    }

    pub fn with_result_log(mut self, results: Arc<ResultLog>) -> Self {
        self.results = Some(results);
        self
    }

    pub fn browser_name(&self) -> &'static str {
        self.browser.name()
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub async fn run(&self, scenario: &Scenario) -> ScenarioReport {
        let started = Instant::now();
        let started_at = Utc::now();
        let ceiling = self.config.timeouts.step();
        info!(scenario = %scenario.name, feature = %scenario.feature, "scenario started");

        let page = match self.browser.open_page().await {
            Ok(page) => page,
            Err(err) => {
                error!(scenario = %scenario.name, error = %err, "could not open a page");
                return ScenarioReport {
                    status: ScenarioStatus::Failed,
                    error: Some(format!("could not open a page: {}", err)),
                    started_at,
                    duration_ms: started.elapsed().as_millis() as u64,
                    ..ScenarioReport::skipped(&scenario.name, &scenario.feature, &scenario.tags)
                };
            }
        };
        let guard = PageGuard::new(Arc::clone(&page));

        let exec = ExecCtx::new(ScenarioId::new(), Instant::now() + ceiling, CancellationToken::new());
        let mut ctx = ScenarioContext::new(scenario.name.clone(), page, Arc::clone(&self.config), exec);
        if let Some(results) = &self.results {
            ctx = ctx.with_result_log(Arc::clone(results));
        }

        let body = AssertUnwindSafe((scenario.body)(&ctx)).catch_unwind();
        let (status, error) = match tokio::time::timeout(ceiling, body).await {
            Ok(Ok(Ok(()))) => (ScenarioStatus::Passed, None),
            Ok(Ok(Err(err))) => (ScenarioStatus::Failed, Some(format!("{:#}", err))),
            Ok(Err(panic)) => (ScenarioStatus::Failed, Some(panic_message(panic.as_ref()))),
            Err(_) => {
                ctx.exec().cancel_token.cancel();
                (
                    ScenarioStatus::TimedOut,
                    Some(format!("scenario exceeded {}ms", ceiling.as_millis())),
                )
            }
        };

        let diagnostics = if status.is_failure() {
            ctx.capture(&format!("{}-failed", slugify(&scenario.name)))
                .await
                .into_iter()
                .map(|artifact| artifact.path)
                .collect()
        } else {
            Vec::new()
        };
        let console_errors = ctx
            .page()
            .drain_events()
            .await
            .iter()
            .filter(|event| event.is_error())
            .count();
        let checks = ctx.checks().records();
        guard.close().await;

        let duration_ms = started.elapsed().as_millis() as u64;
        match &error {
            None => info!(scenario = %scenario.name, duration_ms, console_errors, "scenario passed"),
            Some(err) => error!(scenario = %scenario.name, ?status, duration_ms, error = %err, "scenario failed"),
        }

        ScenarioReport {
            name: scenario.name.clone(),
            feature: scenario.feature.clone(),
            tags: scenario.tags.clone(),
            status,
            error,
            checks,
            console_errors,
            diagnostics,
            started_at,
            duration_ms,
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("scenario panicked: {}", detail)
}
