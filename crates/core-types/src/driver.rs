//! Driver seams consumed by the locator, the retrier and diagnostics.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{AnchorDescriptor, DriverError, PageEvent};

pub type ElementRef = Arc<dyn ElementHandle>;
pub type PageRef = Arc<dyn PageDriver>;

/// One browser page (tab) driven by a single scenario.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate and wait for the document to load
    async fn goto(&self, url: &str) -> Result<(), DriverError>;

    async fn current_url(&self) -> Result<String, DriverError>;

    async fn title(&self) -> Result<String, DriverError>;

    /// All elements currently matching `anchor`, in document order
    async fn query_all(&self, anchor: &AnchorDescriptor) -> Result<Vec<ElementRef>, DriverError>;

    /// Full-page PNG screenshot
    async fn screenshot(&self) -> Result<Vec<u8>, DriverError>;

    /// Serialized document HTML
    async fn html(&self) -> Result<String, DriverError>;

    /// Console/network events recorded since the last drain
    async fn drain_events(&self) -> Vec<PageEvent>;

    /// Release the page and everything registered on it
    async fn close(&self) -> Result<(), DriverError>;
}

/// Handle to a DOM element at query time.
///
/// Handles may go stale after a re-render; callers that act repeatedly must
/// re-query instead of holding on to them.
#[async_trait]
pub trait ElementHandle: Send + Sync {
    /// Human readable description for logs (`<button class="…">`)
    fn describe(&self) -> String;

    async fn is_visible(&self) -> Result<bool, DriverError>;

    async fn is_enabled(&self) -> Result<bool, DriverError>;

    /// Visible text content, whitespace-trimmed
    async fn text(&self) -> Result<String, DriverError>;

    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError>;

    /// Current `value` of a form control
    async fn input_value(&self) -> Result<String, DriverError>;

    /// Constraint-validation message, `None` when the control is valid
    async fn validation_message(&self) -> Result<Option<String>, DriverError>;

    async fn scroll_into_view(&self) -> Result<(), DriverError>;

    async fn click(&self) -> Result<(), DriverError>;

    /// Replace the control's value with `value`
    async fn fill(&self, value: &str) -> Result<(), DriverError>;

    /// Pick the `<option>` of a `<select>` whose value is `value`
    async fn select_option(&self, value: &str) -> Result<(), DriverError>;

    async fn hover(&self) -> Result<(), DriverError>;
}

/// Source of isolated pages, one per scenario.
#[async_trait]
pub trait BrowserFactory: Send + Sync {
    async fn open_page(&self) -> Result<PageRef, DriverError>;

    /// Backend name for reports
    fn name(&self) -> &'static str;
}
