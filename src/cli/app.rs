use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use super::context::CliContext;
use super::dispatch::dispatch;
use super::env::CliArgs;
use super::runtime::{init_logging, load_local_env_overrides, LOCAL_ENV_PATH};
use crate::config::{load_config, LoadedConfig};

pub async fn run() -> Result<()> {
    let overrides = load_local_env_overrides();
    let cli = CliArgs::parse();

    init_logging(&cli.log_level, cli.debug, cli.log_json)?;

    info!("Starting storefront-e2e v{}", env!("CARGO_PKG_VERSION"));
    match overrides {
        Ok(0) => {}
        Ok(applied) => info!(path = LOCAL_ENV_PATH, applied, "Loaded environment overrides"),
        Err(err) => warn!(path = LOCAL_ENV_PATH, error = %err, "failed to read local env overrides"),
    }

    let LoadedConfig { config, path } = load_config(cli.config.as_ref()).await?;
    let cli_context = CliContext::new(config, path);

    match dispatch(&cli, &cli_context).await {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}
