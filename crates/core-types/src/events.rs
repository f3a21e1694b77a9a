use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Console/network activity observed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageEvent {
    pub at: DateTime<Utc>,
    pub kind: PageEventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEventKind {
    Console { level: String, text: String },
    Request { method: String, url: String },
    PageError { message: String },
}

impl PageEvent {
    pub fn now(kind: PageEventKind) -> Self {
        Self {
            at: Utc::now(),
            kind,
        }
    }

    pub fn is_error(&self) -> bool {
        match &self.kind {
            PageEventKind::Console { level, .. } => level.eq_ignore_ascii_case("error"),
            PageEventKind::PageError { .. } => true,
            PageEventKind::Request { .. } => false,
        }
    }
}
