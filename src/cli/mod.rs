pub mod app;
pub mod artifacts;
pub mod audit;
pub mod commands;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod list;
pub mod output;
pub mod run;
pub mod runtime;
pub mod verify_email;

pub use app::run;
pub use artifacts::{cmd_artifacts, ArtifactsArgs};
pub use audit::{cmd_audit, AuditArgs};
pub use list::{cmd_list, ListArgs};
pub use run::{cmd_run, RunArgs};
pub use verify_email::{cmd_verify_email, VerifyEmailArgs};
