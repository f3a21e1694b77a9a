//! Condition-based waiting

use std::time::{Duration, Instant};

use action_locator::Target;
use regex::Regex;
use storefront_core_types::{DriverError, ExecCtx, PageDriver};
use tracing::{debug, warn};

use crate::errors::ActionError;

/// Interval between condition checks
pub const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Something to wait for instead of sleeping.
#[derive(Debug, Clone)]
pub enum WaitCondition {
    /// Any candidate of the target has a visible match
    ElementVisible(Target),
    /// No candidate of the target has a visible match
    ElementHidden(Target),
    UrlMatches(Regex),
    UrlEquals(String),
    TitleContains(String),
    /// Fixed pause; a degraded fallback for updates with no observable signal
    Duration(Duration),
}

impl WaitCondition {
    pub fn describe(&self) -> String {
        match self {
            WaitCondition::ElementVisible(t) => format!("'{}' visible", t.name),
            WaitCondition::ElementHidden(t) => format!("'{}' hidden", t.name),
            WaitCondition::UrlMatches(re) => format!("url =~ /{}/", re.as_str()),
            WaitCondition::UrlEquals(url) => format!("url == {}", url),
            WaitCondition::TitleContains(t) => format!("title contains '{}'", t),
            WaitCondition::Duration(d) => format!("{}ms pause", d.as_millis()),
        }
    }
}

/// Poll `cond` until it holds, `timeout` elapses, or `ctx` is cancelled.
pub async fn wait_for(
    ctx: &ExecCtx,
    page: &dyn PageDriver,
    cond: &WaitCondition,
    timeout: Duration,
) -> Result<(), ActionError> {
    if let WaitCondition::Duration(pause) = cond {
        warn!(
            action_id = %ctx.action_id,
            pause_ms = pause.as_millis() as u64,
            "Fixed pause used instead of a condition wait"
        );
        return sleep_or_cancel(ctx, *pause).await;
    }

    let deadline = (Instant::now() + timeout).min(ctx.deadline);
    loop {
        if ctx.is_cancelled() {
            return Err(ActionError::Interrupted(cond.describe()));
        }
        match holds(page, cond).await {
            Ok(true) => {
                debug!(action_id = %ctx.action_id, condition = %cond.describe(), "Wait satisfied");
                return Ok(());
            }
            Ok(false) => {}
            Err(err) if err.is_transient() => {
                debug!(error = %err, "transient error while waiting");
            }
            Err(err) => return Err(ActionError::Driver(err)),
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(ActionError::WaitTimeout(format!(
                "{} not reached within {}ms",
                cond.describe(),
                timeout.as_millis()
            )));
        }
        sleep_or_cancel(ctx, WAIT_POLL_INTERVAL.min(remaining)).await?;
    }
}

async fn sleep_or_cancel(ctx: &ExecCtx, pause: Duration) -> Result<(), ActionError> {
    tokio::select! {
        _ = ctx.cancel_token.cancelled() => Err(ActionError::Interrupted("wait cancelled".to_string())),
        _ = tokio::time::sleep(pause) => Ok(()),
    }
}

async fn holds(page: &dyn PageDriver, cond: &WaitCondition) -> Result<bool, DriverError> {
    match cond {
        WaitCondition::ElementVisible(target) => any_visible(page, target).await,
        WaitCondition::ElementHidden(target) => any_visible(page, target).await.map(|v| !v),
        WaitCondition::UrlMatches(re) => Ok(re.is_match(&page.current_url().await?)),
        WaitCondition::UrlEquals(url) => Ok(page.current_url().await? == *url),
        WaitCondition::TitleContains(needle) => Ok(page
            .title()
            .await?
            .to_lowercase()
            .contains(&needle.to_lowercase())),
        WaitCondition::Duration(_) => Ok(true),
    }
}

async fn any_visible(page: &dyn PageDriver, target: &Target) -> Result<bool, DriverError> {
    for anchor in &target.candidates {
        let Ok(elements) = page.query_all(anchor).await else {
            continue;
        };
        for element in elements {
            if element.is_visible().await.unwrap_or(false) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}
