//! Disposable test inbox: fetches account verification links

use std::time::Duration;

use action_locator::Target;
use storefront_core_types::AnchorDescriptor;
use tracing::{info, warn};
use url::Url;

use crate::errors::SuiteError;
use crate::scenario::ScenarioContext;

const SERVICE: &str = "mailinator";

pub const CONFIRMATION_SUBJECT: &str = "Account confirmation e-mail";

/// Inbox name for an address: everything before the `@`.
pub fn inbox_name(address: &str) -> &str {
    address.split('@').next().unwrap_or(address)
}

pub struct MailInbox {
    inbox_url: String,
    list_timeout: Duration,
}

impl MailInbox {
    pub fn new(inbox_url: impl Into<String>) -> Self {
        Self {
            inbox_url: inbox_url.into(),
            list_timeout: Duration::from_secs(120),
        }
    }

    pub fn from_context(ctx: &ScenarioContext) -> Self {
        Self::new(ctx.config().site.mailinator_url.clone())
    }

    pub fn with_list_timeout(mut self, timeout: Duration) -> Self {
        self.list_timeout = timeout;
        self
    }

    pub fn inbox_url(&self, inbox: &str) -> String {
        format!("{}?to={}", self.inbox_url, inbox)
    }

    fn message_row(keyword: &str) -> Target {
        Target::new("confirmation message")
            .slug(format!("mailinator-message-{}", keyword))
            .candidate(AnchorDescriptor::xpath(format!(
                r#"//table[contains(@class, "table")]//tbody//tr/td[contains(text(), "{}")]"#,
                keyword
            )))
            .candidate(AnchorDescriptor::css_with_text("table.table tbody tr td", keyword))
    }

    fn first_row() -> Target {
        Target::new("first message")
            .slug("mailinator-first-message")
            .candidate(AnchorDescriptor::xpath(
                r#"//table[contains(@class, "table")]//tbody//tr[1]/td[3]"#,
            ))
            .candidate("table.table tbody tr:first-child td:nth-child(3)")
    }

    fn body_frame() -> Target {
        Target::new("message body frame")
            .slug("mailinator-no-iframe")
            .css_candidates(["iframe#html_msg_body", "#html_msg_body", "iframe[name=\"html_msg_body\"]"])
    }

    fn verification_link_target() -> Target {
        Target::new("verification link")
            .slug("mailinator-no-link")
            .css_candidates([
                r#"a[href*="verify"], a[href*="confirm"], a[href*="activate"], a[href*="token"]"#,
                r#"a[href*="action-token"]"#,
            ])
    }

    /// Open `inbox`, pick the confirmation message and return the
    /// verification link it carries, as an absolute url.
    pub async fn verification_link(
        &self,
        ctx: &ScenarioContext,
        inbox: &str,
    ) -> Result<String, SuiteError> {
        let inbox = inbox_name(inbox);
        ctx.goto(&self.inbox_url(inbox))
            .await
            .map_err(|err| external(format!("inbox {} did not load: {}", inbox, err)))?;
        info!(inbox, "opened test inbox");

        let list_opts = ctx.resolve_options().with_budget(self.list_timeout);
        let first = ctx
            .resolve_with(&Self::first_row(), &list_opts)
            .await
            .map_err(external_from)?;
        if !first.is_found() {
            return Err(external(format!("message list for {} never loaded", inbox)));
        }

        let keyword_opts = ctx.resolve_options().without_capture();
        let keyword_row = Self::message_row(CONFIRMATION_SUBJECT);
        let opened = match ctx.resolve_with(&keyword_row, &keyword_opts).await {
            Ok(result) if result.is_found() => ctx.click(keyword_row).await.is_ok(),
            Ok(_) => false,
            Err(err) => return Err(external_from(err)),
        };
        if !opened {
            warn!(inbox, subject = CONFIRMATION_SUBJECT, "no message with the expected subject; opening the first one");
            ctx.click(Self::first_row())
                .await
                .map_err(|err| external(format!("no message could be opened in {}: {}", inbox, err)))?;
        }

        let frame = ctx.require(&Self::body_frame()).await.map_err(external_from)?;
        let src = frame
            .element
            .attribute("src")
            .await
            .map_err(|err| external(err.to_string()))?
            .ok_or_else(|| external("message body frame has no src"))?;
        let frame_url = absolute(&ctx.current_url().await?, &src)?;
        ctx.goto(&frame_url).await.map_err(external_from)?;

        let link = ctx
            .require(&Self::verification_link_target())
            .await
            .map_err(external_from)?;
        let href = link
            .element
            .attribute("href")
            .await
            .map_err(|err| external(err.to_string()))?
            .filter(|href| !href.trim().is_empty())
            .ok_or_else(|| external("verification link has no href"))?;
        let href = absolute(&frame_url, &href)?;
        info!(inbox, link = %href, "verification link extracted");
        Ok(href)
    }
}

fn absolute(base: &str, reference: &str) -> Result<String, SuiteError> {
    let base = Url::parse(base).map_err(|err| external(format!("bad page url {}: {}", base, err)))?;
    base.join(reference)
        .map(String::from)
        .map_err(|err| external(format!("bad link {}: {}", reference, err)))
}

fn external(message: impl Into<String>) -> SuiteError {
    SuiteError::external(SERVICE, message)
}

fn external_from(err: SuiteError) -> SuiteError {
    match err {
        SuiteError::ExternalService { .. } | SuiteError::Action(_) => err,
        other => external(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbox_is_the_local_part() {
        assert_eq!(inbox_name("test20240101120000000@mailinator.com"), "test20240101120000000");
        assert_eq!(inbox_name("plain-inbox"), "plain-inbox");
    }

    #[test]
    fn relative_links_resolve_against_the_frame() {
        assert_eq!(
            absolute("https://mail.test/msg/42/body", "/verify?token=abc").unwrap(),
            "https://mail.test/verify?token=abc"
        );
        assert!(absolute("not a url", "/x").is_err());
    }
}
