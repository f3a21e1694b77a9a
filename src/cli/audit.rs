use anyhow::{bail, Result};
use clap::{Args, ValueEnum};

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;
use crate::services::{PageSpeedClient, Strategy};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StrategyArg {
    Desktop,
    Mobile,
    Both,
}

impl StrategyArg {
    fn strategies(self) -> Vec<Strategy> {
        match self {
            StrategyArg::Desktop => vec![Strategy::Desktop],
            StrategyArg::Mobile => vec![Strategy::Mobile],
            StrategyArg::Both => vec![Strategy::Desktop, Strategy::Mobile],
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct AuditArgs {
    /// Page to audit; defaults to the storefront home page
    #[arg(long)]
    pub url: Option<String>,

    #[arg(long, value_enum, default_value = "desktop")]
    pub strategy: StrategyArg,

    /// Minimum category score (0.0 - 1.0)
    #[arg(long)]
    pub threshold: Option<f64>,
}

pub async fn cmd_audit(args: AuditArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let config = ctx.config();
    let url = args.url.unwrap_or_else(|| config.site.base_url.clone());
    let mut client = PageSpeedClient::new(&config.pagespeed)?;
    if let Some(threshold) = args.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            bail!("threshold must be between 0 and 1, got {}", threshold);
        }
        client = client.with_threshold(threshold);
    }

    let mut reports = Vec::new();
    for strategy in args.strategy.strategies() {
        reports.push(client.audit(&url, strategy).await?);
    }

    if !output.print_structured(&reports)? {
        for report in &reports {
            println!("{} ({}), threshold {:.2}", report.url, report.strategy, report.threshold);
            for category in &report.scores {
                let score = category
                    .score
                    .map(|s| format!("{:.2}", s))
                    .unwrap_or_else(|| "n/a".to_string());
                let mark = if report.below_threshold.contains(&category.id) {
                    "  below"
                } else {
                    ""
                };
                println!("  {:<16} {}{}", category.id, score, mark);
            }
        }
    }

    let failing: Vec<String> = reports
        .iter()
        .filter(|r| !r.passed())
        .map(|r| format!("{}: {}", r.strategy, r.below_threshold.join(", ")))
        .collect();
    if !failing.is_empty() {
        bail!("categories below threshold ({})", failing.join("; "));
    }
    Ok(())
}
