use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;
use storefront_snapshot_store::{list_artifacts, sweep_dir};
use tracing::info;

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;

#[derive(Args, Clone, Debug)]
pub struct ArtifactsArgs {
    /// Artifact directory; defaults to the configured one
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub action: ArtifactsAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ArtifactsAction {
    /// List captured screenshots and HTML snapshots, oldest first
    List,

    /// Delete artifacts older than the given age
    Sweep {
        /// Age such as `7d` or `12h`; defaults to the configured ttl
        #[arg(long, value_parser = humantime::parse_duration)]
        older_than: Option<Duration>,
    },
}

pub async fn cmd_artifacts(args: ArtifactsArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    let dir = args
        .dir
        .clone()
        .unwrap_or_else(|| ctx.config().artifacts.dir.clone());

    match args.action {
        ArtifactsAction::List => {
            let listed = dir.clone();
            let artifacts = tokio::task::spawn_blocking(move || list_artifacts(&listed))
                .await?
                .with_context(|| format!("listing {}", dir.display()))?;
            if output.print_structured(&artifacts)? {
                return Ok(());
            }
            for artifact in &artifacts {
                println!(
                    "{}  {:<13?}  {}",
                    artifact.created_at.format("%Y-%m-%d %H:%M:%S"),
                    artifact.kind,
                    artifact.path.display()
                );
            }
            println!("{} artifact(s) in {}", artifacts.len(), dir.display());
        }
        ArtifactsAction::Sweep { older_than } => {
            let ttl = match older_than {
                Some(ttl) => ttl,
                None => ctx.config().artifacts.ttl()?,
            };
            let swept = dir.clone();
            let removed = tokio::task::spawn_blocking(move || sweep_dir(&swept, ttl))
                .await?
                .with_context(|| format!("sweeping {}", dir.display()))?;
            info!(dir = %dir.display(), removed, "Swept diagnostic artifacts");
            if !output.print_structured(&json!({ "dir": dir, "removed": removed }))? {
                println!(
                    "Removed {} artifact(s) older than {} from {}",
                    removed,
                    humantime::format_duration(ttl),
                    dir.display()
                );
            }
        }
    }
    Ok(())
}
