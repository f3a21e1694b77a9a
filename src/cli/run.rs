use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use cdp_adapter::ChromiumLauncher;
use clap::Args;
use storefront_core_types::BrowserFactory;
use tracing::info;

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;
use crate::scenario::{storefront_catalog, RunFilter, ScenarioHarness, SuiteRunner};
use crate::services::ResultLog;

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Only run scenarios carrying this tag (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Skip scenarios carrying this tag, on top of the configured ones
    #[arg(long = "exclude", value_name = "TAG")]
    pub exclude: Vec<String>,

    /// Scenarios run at the same time
    #[arg(long)]
    pub parallel: Option<usize>,

    /// Only run scenarios whose name contains this text
    #[arg(long)]
    pub name: Option<String>,

    /// Where to write the JSON run report
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

impl RunArgs {
    pub fn filter(&self, ctx: &CliContext) -> RunFilter {
        let filter = RunFilter::from_config(&ctx.config().runner)
            .include(&self.tags)
            .exclude(&self.exclude);
        match &self.name {
            Some(name) => filter.named(name.clone()),
            None => filter,
        }
    }
}

pub async fn cmd_run(args: RunArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let config = ctx.shared_config();
    let filter = args.filter(ctx);

    let browser: Arc<dyn BrowserFactory> =
        Arc::new(ChromiumLauncher::new(config.browser.clone()));
    let results = Arc::new(ResultLog::from_config(&config.report));
    let harness = ScenarioHarness::new(browser, Arc::clone(&config)).with_result_log(results);
    let mut runner = SuiteRunner::new(harness);
    if let Some(parallel) = args.parallel {
        runner = runner.with_parallel(parallel);
    }

    let catalog = storefront_catalog();
    let report = runner.run(&catalog, &filter).await;

    let path = args
        .report
        .clone()
        .unwrap_or_else(|| config.report.run_report_path());
    report
        .write(&path)
        .await
        .with_context(|| format!("writing run report {}", path.display()))?;
    info!(path = %path.display(), "Run report written");

    if !output.print_structured(&report)? {
        println!("{}", report.summary());
        println!("Run report: {}", path.display());
    }

    if !report.success() {
        bail!("{} scenario(s) failed", report.failed);
    }
    Ok(())
}
