//! Checkout: from a filled cart to a placed order

use action_locator::{CandidateFilter, Target};
use action_primitives::{PostCondition, Step, Verdict};
use storefront_core_types::AnchorDescriptor;
use tracing::{info, warn};

use crate::errors::SuiteError;
use crate::scenario::ScenarioContext;
use crate::storefront::price::{find_dollar_amount, parse_price};

const ADD_ERROR: &str = "Could not add items";

pub struct CheckoutPage<'a> {
    ctx: &'a ScenarioContext,
}

impl<'a> CheckoutPage<'a> {
    pub fn new(ctx: &'a ScenarioContext) -> Self {
        Self { ctx }
    }

    /// Toast shown when the cart refuses an item.
    pub fn add_error_target() -> Target {
        Target::new("add to cart error")
            .candidate(AnchorDescriptor::css_with_text("div.Toastify__toast-body", ADD_ERROR))
            .candidate(AnchorDescriptor::css_with_text("[role='alert']", ADD_ERROR))
    }

    pub fn cart_badge_target() -> Target {
        Target::new("cart badge")
            .slug("cart-badge-debug")
            .css_candidates([
                "div.bg-neutral-900.text-white.text-xs.font-medium",
                "[data-testid='CartCount']",
            ])
    }

    pub fn cart_total_target() -> Target {
        Target::new("cart total")
            .slug("cart-total-debug")
            .candidate("div.font-medium.text-neutral-900")
            .candidate(AnchorDescriptor::css_with_text("div, p", "Total"))
            .filter(CandidateFilter::default().require_text("$"))
    }

    pub fn checkout_button_target() -> Target {
        Target::new("checkout button")
            .slug("checkout-button-debug")
            .candidate(r#"button:has-text("Checkout")"#)
            .candidate(r#"a:has-text("Checkout")"#)
            .candidate(AnchorDescriptor::aria("button", "Checkout"))
    }

    pub fn delivery_method_target() -> Target {
        Target::new("delivery method")
            .slug("delivery-method-debug")
            .candidate(r#"select[name="deliveryMethod"]"#)
            .candidate(AnchorDescriptor::aria("combobox", "Delivery"))
    }

    pub fn order_total_target() -> Target {
        Target::new("order total").candidate(r#"[data-testid="totalOrderPrice"]"#)
    }

    pub fn place_order_target() -> Target {
        Target::new("place order")
            .slug("place-order-debug")
            .candidate(r#"button:has-text("Place Order")"#)
            .candidate(AnchorDescriptor::aria("button", "Place Order"))
    }

    /// Text of the add-to-cart error toast, if one is showing.
    pub async fn add_error(&self) -> Result<Option<String>, SuiteError> {
        match self.ctx.find(&Self::add_error_target()).await? {
            Some(toast) => {
                let text = toast.element.text().await?.trim().to_string();
                warn!(%text, "cart refused the item");
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    /// Item count shown on the header cart badge, 0 without one.
    pub async fn cart_badge_count(&self) -> Result<u32, SuiteError> {
        let Some(badge) = self.ctx.find(&Self::cart_badge_target()).await? else {
            return Ok(0);
        };
        let text = badge.element.text().await?;
        let digits: String = text
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(char::is_ascii_digit)
            .collect();
        Ok(digits.parse().unwrap_or(0))
    }

    pub async fn cart_total(&self) -> Result<Option<f64>, SuiteError> {
        let Some(total) = self.ctx.find(&Self::cart_total_target()).await? else {
            return Ok(None);
        };
        let text = total.element.text().await?;
        Ok(find_dollar_amount(&text).and_then(parse_price))
    }

    /// Leave the cart for checkout; returns the checkout url.
    pub async fn proceed(&self) -> Result<String, SuiteError> {
        let pattern = &self.ctx.config().site.checkout_pattern;
        let post = PostCondition::url_matches(pattern).map_err(|err| {
            SuiteError::Config(format!("site.checkout_pattern '{}': {}", pattern, err))
        })?;
        self.ctx
            .perform(
                Step::click(Self::checkout_button_target())
                    .with_post(post)
                    .with_policy(self.ctx.retry_policy()),
            )
            .await?;
        let url = self.ctx.current_url().await?;
        info!(url = %url, "reached checkout");
        Ok(url)
    }

    /// Pick the configured shipping method.
    pub async fn choose_delivery(&self) -> Result<Verdict, SuiteError> {
        let method = self.ctx.config().site.delivery_method.clone();
        self.ctx.select(Self::delivery_method_target(), &method).await
    }

    /// Grand total; the last rendered total wins when the summary repeats it.
    pub async fn order_total(&self) -> Result<Option<f64>, SuiteError> {
        let totals = self.ctx.texts(&Self::order_total_target()).await?;
        Ok(totals
            .iter()
            .rev()
            .find_map(|text| find_dollar_amount(text).and_then(parse_price)))
    }

    /// Place the order and wait for the orders page.
    pub async fn place_order(&self) -> Result<String, SuiteError> {
        let orders = &self.ctx.config().site.orders_url;
        let post = PostCondition::url_matches(&regex::escape(orders))
            .map_err(|err| SuiteError::Config(format!("site.orders_url '{}': {}", orders, err)))?;
        self.ctx
            .perform(
                Step::click(Self::place_order_target())
                    .with_post(post)
                    .with_policy(self.ctx.retry_policy()),
            )
            .await?;
        let url = self.ctx.current_url().await?;
        info!(url = %url, "order placed");
        Ok(url)
    }
}
