//! Action retrier - bounded, re-resolving interactions
//!
//! This crate wraps UI actions (click, fill, hover) in a retry loop that:
//! - re-resolves the target fresh on every attempt
//! - checks visibility and enabled state before acting
//! - bounds each attempt with its own timeout
//! - verifies an optional post-condition, telling UI rejection apart from
//!   an action that never took effect
//! - captures diagnostics once when all attempts are spent
//!
//! Condition-based waits replace fixed sleeps through [`wait_for`].

pub mod actions;
pub mod errors;
pub mod policy;
pub mod post;
pub mod runner;
pub mod types;
mod waiting;

pub use actions::*;
pub use errors::*;
pub use policy::*;
pub use post::*;
pub use runner::*;
pub use types::*;
pub use waiting::*;
