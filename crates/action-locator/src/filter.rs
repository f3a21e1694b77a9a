//! Per-match sub-filters applied before the visibility check.

use regex::Regex;
use storefront_core_types::{DriverError, ElementHandle};

/// Narrows the matches of every candidate of a target.
///
/// The storefront uses these to skip size labels among color swatches and
/// placeholder images among product images.
#[derive(Debug, Clone, Default)]
pub struct CandidateFilter {
    exclude_text: Option<Regex>,
    require_text: Option<String>,
    require_attributes: Vec<String>,
    reject_attribute_containing: Vec<(String, String)>,
    require_enabled: bool,
}

impl CandidateFilter {
    /// Reject matches whose text matches `pattern`.
    pub fn exclude_text(mut self, pattern: Regex) -> Self {
        self.exclude_text = Some(pattern);
        self
    }

    /// Keep only matches whose text contains `needle` (case-insensitive).
    pub fn require_text(mut self, needle: impl Into<String>) -> Self {
        self.require_text = Some(needle.into());
        self
    }

    pub fn require_attribute(mut self, name: impl Into<String>) -> Self {
        self.require_attributes.push(name.into());
        self
    }

    /// Reject matches whose `name` attribute contains `needle`.
    pub fn reject_attribute_containing(
        mut self,
        name: impl Into<String>,
        needle: impl Into<String>,
    ) -> Self {
        self.reject_attribute_containing
            .push((name.into(), needle.into()));
        self
    }

    pub fn require_enabled(mut self) -> Self {
        self.require_enabled = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.exclude_text.is_none()
            && self.require_text.is_none()
            && self.require_attributes.is_empty()
            && self.reject_attribute_containing.is_empty()
            && !self.require_enabled
    }

    pub async fn accepts(&self, element: &dyn ElementHandle) -> Result<bool, DriverError> {
        if self.exclude_text.is_some() || self.require_text.is_some() {
            let text = element.text().await?;
            if let Some(pattern) = &self.exclude_text {
                if pattern.is_match(&text) {
                    return Ok(false);
                }
            }
            if let Some(needle) = &self.require_text {
                if !text.to_lowercase().contains(&needle.to_lowercase()) {
                    return Ok(false);
                }
            }
        }

        for name in &self.require_attributes {
            if element.attribute(name).await?.is_none() {
                return Ok(false);
            }
        }

        for (name, needle) in &self.reject_attribute_containing {
            if let Some(value) = element.attribute(name).await? {
                if value.contains(needle.as_str()) {
                    return Ok(false);
                }
            }
        }

        if self.require_enabled && !element.is_enabled().await? {
            return Ok(false);
        }
        Ok(true)
    }
}
