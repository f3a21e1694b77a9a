//! Element actions the retrier can perform

use async_trait::async_trait;
use storefront_core_types::{DriverError, ElementHandle};

/// A UI interaction against one resolved element.
#[async_trait]
pub trait ElementAction: Send + Sync {
    /// Short name for logs and reports
    fn name(&self) -> &str;

    async fn perform(&self, element: &dyn ElementHandle) -> Result<(), DriverError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Click;

#[async_trait]
impl ElementAction for Click {
    fn name(&self) -> &str {
        "click"
    }

    async fn perform(&self, element: &dyn ElementHandle) -> Result<(), DriverError> {
        element.click().await
    }
}

/// Replace the value of a form control.
#[derive(Debug, Clone)]
pub struct Fill(pub String);

#[async_trait]
impl ElementAction for Fill {
    fn name(&self) -> &str {
        "fill"
    }

    async fn perform(&self, element: &dyn ElementHandle) -> Result<(), DriverError> {
        element.fill(&self.0).await
    }
}

/// Pick a `<select>` option by value.
#[derive(Debug, Clone)]
pub struct SelectOption(pub String);

#[async_trait]
impl ElementAction for SelectOption {
    fn name(&self) -> &str {
        "select"
    }

    async fn perform(&self, element: &dyn ElementHandle) -> Result<(), DriverError> {
        element.select_option(&self.0).await
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Hover;

#[async_trait]
impl ElementAction for Hover {
    fn name(&self) -> &str {
        "hover"
    }

    async fn perform(&self, element: &dyn ElementHandle) -> Result<(), DriverError> {
        element.hover().await
    }
}
