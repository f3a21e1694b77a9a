use super::artifacts::cmd_artifacts;
use super::audit::cmd_audit;
use super::config::cmd_config;
use super::env::CliArgs;
use super::list::cmd_list;
use super::run::cmd_run;
use super::verify_email::cmd_verify_email;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Run(args) => cmd_run(args, ctx, cli.output.clone()).await,
        Commands::List(args) => cmd_list(args, ctx, cli.output.clone()).await,
        Commands::Audit(args) => cmd_audit(args, ctx, cli.output.clone()).await,
        Commands::VerifyEmail(args) => cmd_verify_email(args, ctx, cli.output.clone()).await,
        Commands::Artifacts(args) => cmd_artifacts(args, ctx, cli.output.clone()).await,
        Commands::Config(args) => cmd_config(args, ctx, cli.output.clone()).await,
    }
}
