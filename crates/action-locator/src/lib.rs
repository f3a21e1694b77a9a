//! Resilient locator - ordered selector candidates with bounded polling
//!
//! This crate turns a semantic target ("the color swatches", "the Home
//! breadcrumb link") into a concrete, currently visible element:
//! - candidates are tried most-specific first
//! - a failing candidate query is an outcome, not an error
//! - only the first few matches of a candidate are inspected
//! - misses are reported with every candidate outcome and diagnostics

pub mod errors;
pub mod filter;
pub mod check;
pub mod resolver;
pub mod types;

pub use errors::*;
pub use filter::*;
pub use resolver::*;
pub use types::*;
