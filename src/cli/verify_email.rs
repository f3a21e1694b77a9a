use std::sync::Arc;

use anyhow::{Context, Result};
use cdp_adapter::ChromiumLauncher;
use clap::Args;
use serde_json::json;
use storefront_core_types::{BrowserFactory, ExecCtx};

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;
use crate::scenario::ScenarioContext;
use crate::services::MailInbox;

#[derive(Args, Clone, Debug)]
pub struct VerifyEmailArgs {
    /// Inbox name or full address
    #[arg(long)]
    pub inbox: String,
}

pub async fn cmd_verify_email(
    args: VerifyEmailArgs,
    ctx: &CliContext,
    output: OutputFormat,
) -> Result<()> {
    let config = ctx.shared_config();
    let launcher = ChromiumLauncher::new(config.browser.clone());
    let page = launcher.open_page().await.context("opening a browser page")?;

    let exec = ExecCtx::with_budget(config.timeouts.step());
    let scenario = ScenarioContext::new("verify-email", Arc::clone(&page), Arc::clone(&config), exec);
    let result = MailInbox::from_context(&scenario)
        .verification_link(&scenario, &args.inbox)
        .await;
    if let Err(err) = page.close().await {
        tracing::warn!(error = %err, "page close failed");
    }
    let link = result?;

    if !output.print_structured(&json!({ "inbox": args.inbox, "link": link }))? {
        println!("{}", link);
    }
    Ok(())
}
