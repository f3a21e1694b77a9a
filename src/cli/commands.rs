use clap::Subcommand;

use super::artifacts::ArtifactsArgs;
use super::audit::AuditArgs;
use super::config::ConfigArgs;
use super::list::ListArgs;
use super::run::RunArgs;
use super::verify_email::VerifyEmailArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run catalog scenarios against a real browser
    Run(RunArgs),

    /// List catalog scenarios
    List(ListArgs),

    /// Run a PageSpeed Insights audit
    Audit(AuditArgs),

    /// Fetch the account verification link from a test inbox
    VerifyEmail(VerifyEmailArgs),

    /// Inspect or sweep diagnostic artifacts
    Artifacts(ArtifactsArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}
