//! Shopping cart page

use action_locator::Target;
use action_primitives::Verdict;
use storefront_core_types::AnchorDescriptor;
use tracing::{info, warn};

use crate::errors::SuiteError;
use crate::scenario::ScenarioContext;
use crate::storefront::price::parse_price;

const ITEM: &str = "li.flex.gap-x-2";

pub struct CartPage<'a> {
    ctx: &'a ScenarioContext,
}

impl<'a> CartPage<'a> {
    pub fn new(ctx: &'a ScenarioContext) -> Self {
        Self { ctx }
    }

    /// `index` is zero-based.
    pub fn quantity_target(index: usize) -> Target {
        Target::new(format!("cart item {} quantity", index + 1))
            .slug("cart-quantity-debug")
            .candidate(format!("{}:nth-child({}) input[type='number']", ITEM, index + 1))
            .candidate(format!("{}:nth-child({}) input", ITEM, index + 1))
    }

    pub fn delete_target(index: usize) -> Target {
        Target::new(format!("cart item {} delete", index + 1))
            .slug("cart-delete-debug")
            .candidate(format!("{}:nth-child({}) button span:has-text('Delete')", ITEM, index + 1))
            .candidate(format!("{}:nth-child({}) button:has-text('Delete')", ITEM, index + 1))
    }

    /// Delete button of the first item still shown.
    pub fn first_delete_target() -> Target {
        Target::new("first cart item delete")
            .slug("cart-delete-debug")
            .candidate(format!("{} button span:has-text('Delete')", ITEM))
            .candidate(format!("{} button:has-text('Delete')", ITEM))
            .candidate(AnchorDescriptor::aria("button", "Delete"))
    }

    pub fn subtotal_target() -> Target {
        Target::new("subtotal")
            .slug("cart-subtotal-debug")
            .candidate(AnchorDescriptor::text("Subtotal"))
            .candidate(AnchorDescriptor::css_with_text("div, p, span", "Subtotal"))
    }

    pub async fn open(&self) -> Result<(), SuiteError> {
        let url = self.ctx.config().site.cart_url.clone();
        self.ctx.goto(&url).await
    }

    /// Number of visible line items.
    pub async fn item_count(&self) -> Result<usize, SuiteError> {
        let mut count = 0;
        for item in self.ctx.page().query_all(&AnchorDescriptor::css(ITEM)).await? {
            if item.is_visible().await? {
                count += 1;
            }
        }
        Ok(count)
    }

    pub async fn is_empty(&self) -> Result<bool, SuiteError> {
        Ok(self.item_count().await? == 0)
    }

    pub async fn change_quantity(&self, index: usize, quantity: u32) -> Result<Verdict, SuiteError> {
        self.ctx
            .fill(Self::quantity_target(index), &quantity.to_string())
            .await
    }

    pub async fn remove_item(&self, index: usize) -> Result<Verdict, SuiteError> {
        self.ctx.click(Self::delete_target(index)).await
    }

    /// Remove line items until none is left. Gives up once an attempt
    /// removes nothing.
    pub async fn clear(&self) -> Result<(), SuiteError> {
        let mut remaining = self.item_count().await?;
        while remaining > 0 {
            self.ctx.click(Self::first_delete_target()).await?;
            let now = self.item_count().await?;
            if now >= remaining {
                warn!(remaining = now, "delete did not shrink the cart");
                return Err(SuiteError::Check(format!(
                    "cart still holds {} item(s) after delete",
                    now
                )));
            }
            remaining = now;
        }
        info!("cart cleared");
        Ok(())
    }

    /// Prices of the visible line items.
    pub async fn item_prices(&self) -> Result<Vec<f64>, SuiteError> {
        let anchor = AnchorDescriptor::css(format!("{} p:has-text('$')", ITEM));
        let mut prices = Vec::new();
        for price in self.ctx.page().query_all(&anchor).await? {
            if !price.is_visible().await? {
                continue;
            }
            if let Some(value) = parse_price(&price.text().await?) {
                prices.push(value);
            }
        }
        Ok(prices)
    }

    pub async fn item_price(&self, index: usize) -> Result<Option<f64>, SuiteError> {
        let target = Target::new(format!("cart item {} price", index + 1))
            .candidate(format!("{}:nth-child({}) p:has-text('$')", ITEM, index + 1));
        let Some(resolved) = self.ctx.find(&target).await? else {
            return Ok(None);
        };
        Ok(parse_price(&resolved.element.text().await?))
    }

    /// Subtotal from the last "Subtotal" label on the page.
    pub async fn subtotal(&self) -> Result<Option<f64>, SuiteError> {
        let texts = self.ctx.texts(&Self::subtotal_target()).await?;
        Ok(texts.last().and_then(|text| parse_price(text)))
    }
}
