//! Anchor descriptors: the concrete ways of locating one element.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single selector candidate.
///
/// Mirrors the locator flavours used across the storefront suite:
/// - plain CSS selectors
/// - XPath expressions (mail inbox tables)
/// - text content matching
/// - ARIA role + accessible name
/// - CSS narrowed by contained text (`a:has-text("Home")` style)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnchorDescriptor {
    /// CSS selector
    Css(String),

    /// XPath expression
    XPath(String),

    /// Text content (exact or partial match)
    Text { content: String, exact: bool },

    /// ARIA role and accessible name (partial, case-insensitive)
    Aria { role: String, name: String },

    /// CSS selector whose matches must contain `text`
    CssWithText { selector: String, text: String },
}

impl AnchorDescriptor {
    pub fn css(selector: impl Into<String>) -> Self {
        AnchorDescriptor::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        AnchorDescriptor::XPath(expr.into())
    }

    pub fn text(content: impl Into<String>) -> Self {
        AnchorDescriptor::Text {
            content: content.into(),
            exact: false,
        }
    }

    pub fn exact_text(content: impl Into<String>) -> Self {
        AnchorDescriptor::Text {
            content: content.into(),
            exact: true,
        }
    }

    pub fn aria(role: impl Into<String>, name: impl Into<String>) -> Self {
        AnchorDescriptor::Aria {
            role: role.into(),
            name: name.into(),
        }
    }

    pub fn css_with_text(selector: impl Into<String>, text: impl Into<String>) -> Self {
        AnchorDescriptor::CssWithText {
            selector: selector.into(),
            text: text.into(),
        }
    }

    /// Short strategy label used in logs and reports.
    pub fn strategy(&self) -> &'static str {
        match self {
            AnchorDescriptor::Css(_) => "css",
            AnchorDescriptor::XPath(_) => "xpath",
            AnchorDescriptor::Text { .. } => "text",
            AnchorDescriptor::Aria { .. } => "aria",
            AnchorDescriptor::CssWithText { .. } => "css+text",
        }
    }

    /// Whether the descriptor carries anything to search for.
    pub fn is_blank(&self) -> bool {
        match self {
            AnchorDescriptor::Css(s) | AnchorDescriptor::XPath(s) => s.trim().is_empty(),
            AnchorDescriptor::Text { content, .. } => content.trim().is_empty(),
            AnchorDescriptor::Aria { role, .. } => role.trim().is_empty(),
            AnchorDescriptor::CssWithText { selector, .. } => selector.trim().is_empty(),
        }
    }
}

impl fmt::Display for AnchorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorDescriptor::Css(s) => write!(f, "css:{}", s),
            AnchorDescriptor::XPath(s) => write!(f, "xpath:{}", s),
            AnchorDescriptor::Text { content, exact } => {
                if *exact {
                    write!(f, "text:exact:'{}'", content)
                } else {
                    write!(f, "text:partial:'{}'", content)
                }
            }
            AnchorDescriptor::Aria { role, name } => write!(f, "aria:{}[name='{}']", role, name),
            AnchorDescriptor::CssWithText { selector, text } => {
                write!(f, "css:{}:has-text('{}')", selector, text)
            }
        }
    }
}

impl From<&str> for AnchorDescriptor {
    fn from(selector: &str) -> Self {
        AnchorDescriptor::Css(selector.to_string())
    }
}

impl From<String> for AnchorDescriptor {
    fn from(selector: String) -> Self {
        AnchorDescriptor::Css(selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_strategy_prefix() {
        assert_eq!(AnchorDescriptor::css("h1").to_string(), "css:h1");
        assert_eq!(
            AnchorDescriptor::exact_text("Home").to_string(),
            "text:exact:'Home'"
        );
        assert_eq!(
            AnchorDescriptor::css_with_text("nav a", "Home").to_string(),
            "css:nav a:has-text('Home')"
        );
    }

    #[test]
    fn blank_descriptors_are_detected() {
        assert!(AnchorDescriptor::css("   ").is_blank());
        assert!(AnchorDescriptor::aria("", "Submit").is_blank());
        assert!(!AnchorDescriptor::text("Add to Cart").is_blank());
    }
}
