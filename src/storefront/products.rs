//! Product listing and breadcrumb navigation

use action_locator::Target;
use action_primitives::Verdict;
use once_cell::sync::Lazy;
use regex::Regex;
use storefront_core_types::AnchorDescriptor;
use tracing::{debug, info};

use crate::errors::SuiteError;
use crate::scenario::ScenarioContext;

/// `From: $X.X` or `From: $X.X - $Y.Y`
pub static PRICE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^From:\s*\$\d+(\.\d+)?(\s*-\s*\$\d+(\.\d+)?)?$").expect("static regex")
});

/// Normalised similarity above which a crumb counts as the expected label
const LABEL_SIMILARITY: f64 = 0.85;

/// Whether a breadcrumb item reads as `expected`: case-insensitive
/// containment first, then a fuzzy match to absorb stray icons and
/// separators in the rendered text.
pub fn label_matches(item: &str, expected: &str) -> bool {
    let item = item.trim().to_lowercase();
    let expected = expected.trim().to_lowercase();
    if expected.is_empty() {
        return false;
    }
    item.contains(&expected) || strsim::normalized_levenshtein(&item, &expected) >= LABEL_SIMILARITY
}

/// Whether every label in `expected` appears in `items`, in that order.
pub fn in_order(items: &[String], expected: &[&str]) -> bool {
    let mut remaining = items.iter();
    expected
        .iter()
        .all(|label| remaining.any(|item| label_matches(item, label)))
}

pub struct ProductsPage<'a> {
    ctx: &'a ScenarioContext,
}

impl<'a> ProductsPage<'a> {
    pub fn new(ctx: &'a ScenarioContext) -> Self {
        Self { ctx }
    }

    pub fn breadcrumb_items_target() -> Target {
        Target::new("breadcrumb items")
            .slug("breadcrumb-order-debug")
            .css_candidates([
                "nav a, nav span",
                ".breadcrumb a, .breadcrumb span",
                "[class*=crumb] a, [class*=crumb] span",
                "[data-testid*=crumb] a, [data-testid*=crumb] span",
                "nav *",
                ".breadcrumbs *",
                "header a, header span",
                "a, span",
            ])
    }

    pub fn home_link_target() -> Target {
        Target::new("home link")
            .slug("home-link-click-debug")
            .css_candidates([
                r#"nav a:has-text("Home")"#,
                r#".breadcrumb a:has-text("Home")"#,
                r#"[data-testid*="breadcrumb"] a:has-text("Home")"#,
                r#"[class*="breadcrumb"] a:has-text("Home")"#,
                r#"header a:has-text("Home")"#,
                r#"a:has-text("Home")"#,
            ])
            .candidate(AnchorDescriptor::aria("link", "Home"))
    }

    pub fn breadcrumb_label_target(label: &str) -> Target {
        Target::new(format!("breadcrumb label {}", label))
            .candidate(AnchorDescriptor::css_with_text("nav a, nav span", label))
            .candidate(AnchorDescriptor::css_with_text(
                "[data-testid*=\"breadcrumb\"] *",
                label,
            ))
            .candidate(AnchorDescriptor::css_with_text(".breadcrumb *", label))
    }

    pub fn product_cards_target() -> Target {
        Target::new("product cards")
            .candidate(r#"[data-testid="ProductElement"] h3"#)
            .candidate(r#"[data-testid="ProductElement"]"#)
    }

    pub fn first_product_link_target() -> Target {
        Target::new("first product link")
            .candidate(r#"[data-testid="ProductElement"] a"#)
            .candidate(AnchorDescriptor::aria("link", ""))
    }

    pub fn price_range_target() -> Target {
        Target::new("product price range")
            .candidate(r#"[data-testid="ProductElement_PriceRange"]"#)
    }

    pub async fn open(&self) -> Result<(), SuiteError> {
        let url = self.ctx.config().site.products_url.clone();
        self.ctx.goto(&url).await
    }

    /// Non-empty breadcrumb texts from the first selector that yields any.
    pub async fn breadcrumb_items(&self) -> Result<Vec<String>, SuiteError> {
        let items: Vec<String> = self
            .ctx
            .texts(&Self::breadcrumb_items_target())
            .await?
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();
        if items.is_empty() {
            self.ctx.capture("breadcrumb-order-debug").await;
        }
        debug!(?items, "breadcrumb items");
        Ok(items)
    }

    pub async fn has_breadcrumb_label(&self, label: &str) -> Result<bool, SuiteError> {
        Ok(self
            .ctx
            .find(&Self::breadcrumb_label_target(label))
            .await?
            .is_some())
    }

    /// Click "Home" and report where it led.
    pub async fn click_home(&self) -> Result<String, SuiteError> {
        self.ctx.click(Self::home_link_target()).await?;
        let url = self.ctx.current_url().await?;
        info!(url = %url, "followed home link");
        Ok(url)
    }

    pub async fn hover_home(&self) -> Result<Verdict, SuiteError> {
        self.ctx.hover(Self::home_link_target()).await
    }

    pub async fn product_names(&self) -> Result<Vec<String>, SuiteError> {
        Ok(self
            .ctx
            .texts(&Self::product_cards_target())
            .await?
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect())
    }

    pub async fn first_price_range(&self) -> Result<Option<String>, SuiteError> {
        let Some(resolved) = self.ctx.find(&Self::price_range_target()).await? else {
            return Ok(None);
        };
        Ok(Some(resolved.element.text().await?.trim().to_string()))
    }

    /// Open the first product; returns its listed name.
    pub async fn open_first_product(&self) -> Result<String, SuiteError> {
        let link = self.ctx.require(&Self::first_product_link_target()).await?;
        let name = link.element.text().await?.trim().to_string();
        self.ctx.click(Self::first_product_link_target()).await?;
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fuzzy_labels_absorb_decoration() {
        assert!(label_matches("  HOME ", "Home"));
        assert!(label_matches("Products >", "Products"));
        assert!(label_matches("Prodcts", "Products"));
        assert!(!label_matches("Cart", "Products"));
        assert!(!label_matches("Home", ""));
    }

    #[test]
    fn order_is_checked_left_to_right() {
        let crumbs = items(&["Home", "/", "Products", "Bella Tee"]);
        assert!(in_order(&crumbs, &["Home", "Products"]));
        assert!(!in_order(&crumbs, &["Products", "Home"]));
        assert!(!in_order(&crumbs, &["Home", "Orders"]));
    }

    #[test]
    fn price_range_layout() {
        assert!(PRICE_RANGE.is_match("From: $7.42"));
        assert!(PRICE_RANGE.is_match("From: $7.42 - $12"));
        assert!(!PRICE_RANGE.is_match("$7.42"));
    }
}
