//! Product detail page

use action_locator::{CandidateFilter, ResolutionResult, Target};
use action_primitives::{PostCondition, Step, Verdict};
use once_cell::sync::Lazy;
use regex::Regex;
use storefront_core_types::AnchorDescriptor;
use tracing::{debug, info};

use crate::errors::SuiteError;
use crate::scenario::ScenarioContext;
use crate::storefront::price::{find_dollar_amount, parse_price};

/// Labels rendered on size buttons; never a colour.
pub static SIZE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(XS|S|M|L|XL|2XL|3XL|4XL|5XL)$").expect("static regex"));

/// Swatches inspected when listing colours
const MAX_SWATCHES: usize = 5;
/// Images inspected when looking for a real product image
const MAX_IMAGES: usize = 3;

pub struct ProductDetailPage<'a> {
    ctx: &'a ScenarioContext,
}

impl<'a> ProductDetailPage<'a> {
    pub fn new(ctx: &'a ScenarioContext) -> Self {
        Self { ctx }
    }

    pub fn url_for(ctx: &ScenarioContext, slug: &str) -> String {
        format!("{}/{}", ctx.config().site.products_url, slug)
    }

    pub fn title_target() -> Target {
        Target::new("product title")
            .css_candidates([
                r"h1.hidden.md\:flex.break-words.leading-tight.transition-all.duration-200.md\:mb-4.text-\[32px\].lg\:text-4xl.font-bold.tracking-tight",
                r"h1.hidden.md\:flex",
            ])
            .candidate(AnchorDescriptor::aria("heading", ""))
    }

    pub fn images_target() -> Target {
        Target::new("product images")
            .css_candidates([
                "div.relative.aspect-square.w-full img",
                "div[data-swiper-slide-index] img",
                "img",
                ".product-gallery img",
                "[data-testid*='image'] img",
                ".swiper-slide img",
                "div img",
            ])
            .filter(
                CandidateFilter::default()
                    .require_attribute("src")
                    .reject_attribute_containing("src", "placeholder"),
            )
    }

    /// Round colour swatches. One candidate on purpose: a page without
    /// swatches must end in a miss with a `color-options-debug` snapshot.
    pub fn color_swatches_target() -> Target {
        Target::new("color options")
            .slug("color-options-debug")
            .candidate(r#"button.rounded-full[title][style*="background-color"]"#)
            .filter(CandidateFilter::default().exclude_text(SIZE_LABEL.clone()))
    }

    pub fn color_option_target(color: &str) -> Target {
        Target::new(format!("color {}", color))
            .slug("color-select-debug")
            .candidate(format!(r#"button.rounded-full[title="{}"]"#, color))
            .candidate(AnchorDescriptor::aria("button", color))
    }

    pub fn size_buttons_target() -> Target {
        Target::new("size options")
            .slug("size-options-debug")
            .candidate(r#"div.flex-wrap button[title]:not([class*="rounded-full"])"#)
            .css_candidates(
                ["XS", "S", "M", "L", "XL", "2XL", "3XL"]
                    .iter()
                    .map(|size| format!(r#"button:has-text("{}")"#, size)),
            )
    }

    pub fn size_option_target(size: &str) -> Target {
        Target::new(format!("size {}", size))
            .slug("size-select-debug")
            .candidate(format!(r#"button[title="{}"]"#, size))
            .candidate(format!(r#"button[title*="{}"]"#, size))
            .candidate(AnchorDescriptor::exact_text(size))
    }

    pub fn quantity_target() -> Target {
        Target::new("quantity")
            .css_candidates([r#"input[type="number"]"#, r#"input[name="quantity"]"#])
            .candidate(AnchorDescriptor::aria("spinbutton", ""))
    }

    pub fn add_to_cart_target() -> Target {
        Target::new("add to cart")
            .candidate("#add-to-cart-button")
            .candidate(r#"button:has-text("Add to Cart")"#)
            .candidate(AnchorDescriptor::aria("button", "Add to Cart"))
    }

    pub fn price_target() -> Target {
        Target::new("product price")
            .slug("price-debug")
            .css_candidates([
                "div.ml-2.text-3xl.font-extrabold.text-black",
                "div.text-3xl.font-extrabold.text-black",
                "div.font-extrabold.text-black",
                r#"div:has-text("$")"#,
                "div.text-3xl.font-extrabold",
                "div.font-extrabold",
            ])
            .filter(CandidateFilter::default().require_text("$"))
    }

    pub fn start_design_target() -> Target {
        Target::new("start design")
            .candidate(r#"button:has-text("Start Design")"#)
            .candidate(r#"a:has-text("Start Design")"#)
            .candidate(AnchorDescriptor::aria("button", "Design"))
    }

    pub async fn open(&self, slug: &str) -> Result<(), SuiteError> {
        self.ctx.goto(&Self::url_for(self.ctx, slug)).await
    }

    pub async fn title(&self) -> Result<String, SuiteError> {
        let resolved = self.ctx.require(&Self::title_target()).await?;
        Ok(resolved.element.text().await?.trim().to_string())
    }

    /// Whether a real (non placeholder) product image is shown.
    pub async fn has_product_image(&self) -> Result<bool, SuiteError> {
        let opts = self.ctx.resolve_options().with_max_checked(MAX_IMAGES);
        Ok(self
            .ctx
            .resolve_with(&Self::images_target(), &opts)
            .await?
            .is_found())
    }

    /// Colour names taken from the swatch titles; empty when the page has
    /// none.
    pub async fn color_options(&self) -> Result<Vec<String>, SuiteError> {
        let opts = self.ctx.resolve_options().with_max_checked(MAX_SWATCHES);
        let anchor = match self.ctx.resolve_with(&Self::color_swatches_target(), &opts).await? {
            ResolutionResult::Found(resolved) => resolved.anchor,
            ResolutionResult::NotFound { tried, diagnostics } => {
                info!(
                    tried = tried.len(),
                    diagnostics = ?diagnostics.first().map(|a| a.path.display().to_string()),
                    "no colour swatches on the page"
                );
                return Ok(Vec::new());
            }
        };

        let mut colors = Vec::new();
        for swatch in self.ctx.page().query_all(&anchor).await?.iter().take(MAX_SWATCHES) {
            let label = swatch.text().await.unwrap_or_default();
            if SIZE_LABEL.is_match(label.trim()) {
                continue;
            }
            if let Some(title) = swatch.attribute("title").await? {
                if !title.trim().is_empty() && !SIZE_LABEL.is_match(title.trim()) {
                    colors.push(title.trim().to_string());
                }
            }
        }
        debug!(?colors, "colour options");
        Ok(colors)
    }

    pub async fn select_color(&self, color: &str) -> Result<Verdict, SuiteError> {
        self.ctx.click(Self::color_option_target(color)).await
    }

    pub async fn size_options(&self) -> Result<Vec<String>, SuiteError> {
        let texts = self.ctx.texts(&Self::size_buttons_target()).await?;
        Ok(texts
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect())
    }

    pub async fn select_size(&self, size: &str) -> Result<Verdict, SuiteError> {
        self.ctx.click(Self::size_option_target(size)).await
    }

    /// Fill the quantity box. Out-of-range input comes back as
    /// [`Verdict::RejectedByUi`], not as an error.
    pub async fn set_quantity(&self, quantity: &str) -> Result<Verdict, SuiteError> {
        self.ctx.fill(Self::quantity_target(), quantity).await
    }

    pub async fn quantity(&self) -> Result<String, SuiteError> {
        let resolved = self.ctx.require(&Self::quantity_target()).await?;
        Ok(resolved.element.input_value().await?)
    }

    pub async fn add_to_cart(&self) -> Result<Verdict, SuiteError> {
        self.ctx.click(Self::add_to_cart_target()).await
    }

    /// Click "Add to Cart" without a session and expect the sign-in redirect.
    pub async fn add_to_cart_expecting_sign_in(&self) -> Result<Verdict, SuiteError> {
        let pattern = &self.ctx.config().site.auth_redirect_pattern;
        let post = PostCondition::url_matches(pattern).map_err(|err| {
            SuiteError::Config(format!("site.auth_redirect_pattern '{}': {}", pattern, err))
        })?;
        self.ctx
            .perform(
                Step::click(Self::add_to_cart_target())
                    .with_post(post)
                    .with_policy(self.ctx.retry_policy())
                    .with_slug("add-to-cart-debug"),
            )
            .await
    }

    /// Displayed price, when one is shown as `$12.34`.
    pub async fn price(&self) -> Result<Option<f64>, SuiteError> {
        let Some(resolved) = self.ctx.find(&Self::price_target()).await? else {
            return Ok(None);
        };
        let text = resolved.element.text().await?;
        Ok(find_dollar_amount(&text).and_then(parse_price))
    }

    pub async fn start_design(&self) -> Result<Verdict, SuiteError> {
        self.ctx.click(Self::start_design_target()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_labels_are_recognised() {
        for label in ["XS", "S", "M", "XL", "5XL"] {
            assert!(SIZE_LABEL.is_match(label), "{label}");
        }
        for label in ["Black", "Heather Navy", "SM", "6XL"] {
            assert!(!SIZE_LABEL.is_match(label), "{label}");
        }
    }

    #[test]
    fn swatch_target_has_a_single_candidate() {
        let target = ProductDetailPage::color_swatches_target();
        assert_eq!(target.candidates.len(), 1);
        assert_eq!(target.slug, "color-options-debug");
    }
}
