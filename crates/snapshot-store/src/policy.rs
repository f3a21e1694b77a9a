use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What diagnostic capture writes, and where.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapturePolicy {
    pub root: PathBuf,
    pub screenshot: bool,
    pub html: bool,
}

impl Default for CapturePolicy {
    fn default() -> Self {
        Self {
            root: PathBuf::from("results/artifacts"),
            screenshot: true,
            html: true,
        }
    }
}

impl CapturePolicy {
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn enabled(&self) -> bool {
        self.screenshot || self.html
    }
}
