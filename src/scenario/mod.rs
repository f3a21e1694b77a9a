//! Scenario execution: per-scenario context, harness, catalog and runner

pub mod catalog;
pub mod checks;
pub mod context;
pub mod harness;
pub mod report;
pub mod runner;

pub use catalog::{storefront_catalog, Scenario, ScenarioFn};
pub use checks::{CheckLog, CheckMode, CheckRecord};
pub use context::ScenarioContext;
pub use harness::ScenarioHarness;
pub use report::{RunReport, ScenarioReport, ScenarioStatus};
pub use runner::{RunFilter, SuiteRunner};
