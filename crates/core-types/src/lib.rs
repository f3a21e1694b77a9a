//! Shared primitives for the storefront e2e framework.
//!
//! Everything above this crate talks to a browser only through the
//! [`PageDriver`] / [`ElementHandle`] seams defined here, so the resolver and
//! retrier can run against a real Chromium page or an in-memory fixture.

mod anchor;
mod ctx;
mod driver;
mod errors;
mod events;

pub use anchor::AnchorDescriptor;
pub use ctx::ExecCtx;
pub use driver::{BrowserFactory, ElementHandle, ElementRef, PageDriver, PageRef};
pub use errors::DriverError;
pub use events::{PageEvent, PageEventKind};

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ScenarioId(pub String);

impl ScenarioId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ScenarioId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub String);

impl ActionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
