use clap::Parser;
use std::path::PathBuf;

use super::commands::Commands;

/// Storefront end-to-end suite
#[derive(Parser)]
#[command(name = "storefront-e2e", author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Suite configuration (YAML); defaults to ./config/storefront.yaml
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Shorthand for `--log-level debug`
    #[arg(short, long)]
    pub debug: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Output format
    #[arg(short, long, default_value = "human")]
    pub output: crate::cli::output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}
