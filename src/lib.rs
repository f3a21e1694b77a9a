//! Storefront end-to-end suite
//!
//! Page objects and scenarios for the storefront, running on the resilient
//! locator and action retrier crates. Exposes modules for integration testing.

pub mod cli;
pub mod config;
pub mod errors;
pub mod scenario;
pub mod services;
pub mod storefront;

pub use config::{load_config, LoadedConfig, SuiteConfig};
pub use errors::SuiteError;
pub use scenario::{ScenarioContext, ScenarioHarness, SuiteRunner};
