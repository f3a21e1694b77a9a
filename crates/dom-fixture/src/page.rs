use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use storefront_core_types::{
    AnchorDescriptor, BrowserFactory, DriverError, ElementHandle, ElementRef, PageDriver,
    PageEvent, PageEventKind, PageRef,
};
use tracing::debug;

use crate::dom::{contains_ci, Document};
use crate::node::{ClickEffect, Node};
use crate::selector::parse_selector;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

struct PageState {
    doc: Document,
    url: String,
    generation: u64,
    closed: bool,
    events: Vec<PageEvent>,
    fail_screenshots: bool,
    queries: usize,
    query_delay: Option<Duration>,
    routes: HashMap<String, Node>,
}

impl PageState {
    fn ensure_open(&self) -> Result<(), DriverError> {
        if self.closed {
            Err(DriverError::Closed(format!("page at {} is closed", self.url)))
        } else {
            Ok(())
        }
    }

    fn navigate(&mut self, url: &str) {
        self.url = url.to_string();
        self.events.push(PageEvent::now(PageEventKind::Request {
            method: "GET".to_string(),
            url: url.to_string(),
        }));
        // Urls without a registered route keep the current document.
        if let Some(root) = self.routes.get(url) {
            self.doc = Document::from_root(root);
            self.generation += 1;
        }
    }

    fn select_css(&self, css: &str) -> Result<Vec<usize>, DriverError> {
        let list = parse_selector(css)?;
        Ok(self.doc.select(&list))
    }

    fn apply(&mut self, effect: &ClickEffect) {
        match effect {
            ClickEffect::Navigate(url) => self.navigate(url),
            ClickEffect::Reveal(css) | ClickEffect::Hide(css) => {
                let hide = matches!(effect, ClickEffect::Hide(_));
                if let Ok(ids) = self.select_css(css) {
                    for id in ids {
                        self.doc.node_mut(id).set_flag("hidden", hide);
                    }
                }
            }
            ClickEffect::Rerender => self.generation += 1,
        }
    }
}

/// In-memory page implementing [`PageDriver`].
///
/// Cloning yields another handle onto the same page, so tests can keep one
/// clone for mutations while the code under test drives another.
#[derive(Clone)]
pub struct FakePage {
    state: Arc<Mutex<PageState>>,
}

impl FakePage {
    pub fn new(root: Node) -> Self {
        Self::at("about:blank", root)
    }

    pub fn at(url: impl Into<String>, root: Node) -> Self {
        Self {
            state: Arc::new(Mutex::new(PageState {
                doc: Document::from_root(&root),
                url: url.into(),
                generation: 0,
                closed: false,
                events: Vec::new(),
                fail_screenshots: false,
                queries: 0,
                query_delay: None,
                routes: HashMap::new(),
            })),
        }
    }

    /// Register the document served when navigating to `url`.
    pub fn with_route(self, url: impl Into<String>, root: Node) -> Self {
        self.state.lock().routes.insert(url.into(), root);
        self
    }

    pub fn driver(&self) -> PageRef {
        Arc::new(self.clone())
    }

    pub fn url(&self) -> String {
        self.state.lock().url.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of `query_all` calls served so far.
    pub fn query_count(&self) -> usize {
        self.state.lock().queries
    }

    /// Delay every query, simulating a page that never settles.
    pub fn set_query_delay(&self, delay: Option<Duration>) {
        self.state.lock().query_delay = delay;
    }

    pub fn fail_screenshots(&self, fail: bool) {
        self.state.lock().fail_screenshots = fail;
    }

    pub fn push_event(&self, event: PageEvent) {
        self.state.lock().events.push(event);
    }

    pub fn set_hidden(&self, css: &str, hidden: bool) -> Result<usize, DriverError> {
        self.set_flag(css, "hidden", hidden)
    }

    pub fn set_disabled(&self, css: &str, disabled: bool) -> Result<usize, DriverError> {
        self.set_flag(css, "disabled", disabled)
    }

    fn set_flag(&self, css: &str, flag: &str, on: bool) -> Result<usize, DriverError> {
        let mut st = self.state.lock();
        let ids = st.select_css(css)?;
        for id in &ids {
            st.doc.node_mut(*id).set_flag(flag, on);
        }
        Ok(ids.len())
    }

    /// Replace the whole document; outstanding handles go stale.
    pub fn replace_document(&self, root: Node) {
        let mut st = self.state.lock();
        st.doc = Document::from_root(&root);
        st.generation += 1;
    }

    /// Re-render in place; outstanding handles go stale.
    pub fn rerender(&self) {
        self.state.lock().generation += 1;
    }

    /// Current value of the first form control matching `css`.
    pub fn value_of(&self, css: &str) -> Option<String> {
        let st = self.state.lock();
        let id = *st.select_css(css).ok()?.first()?;
        Some(st.doc.node(id).value.clone())
    }

    /// Click attempts (failed ones included) on elements matching `css`.
    pub fn click_count(&self, css: &str) -> u32 {
        let st = self.state.lock();
        st.select_css(css)
            .map(|ids| ids.iter().map(|id| st.doc.node(*id).clicks).sum())
            .unwrap_or(0)
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        let mut st = self.state.lock();
        st.ensure_open()?;
        st.navigate(url);
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let st = self.state.lock();
        st.ensure_open()?;
        Ok(st.url.clone())
    }

    async fn title(&self) -> Result<String, DriverError> {
        let st = self.state.lock();
        st.ensure_open()?;
        Ok(st.doc.title())
    }

    async fn query_all(&self, anchor: &AnchorDescriptor) -> Result<Vec<ElementRef>, DriverError> {
        let delay = {
            let mut st = self.state.lock();
            st.ensure_open()?;
            st.queries += 1;
            st.query_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let st = self.state.lock();
        st.ensure_open()?;
        let ids = match anchor {
            AnchorDescriptor::Css(css) => st.select_css(css)?,
            AnchorDescriptor::XPath(expr) => {
                return Err(DriverError::InvalidSelector(format!(
                    "xpath is not supported by the fixture: {}",
                    expr
                )))
            }
            AnchorDescriptor::Text { content, exact } => st.doc.find_text(content, *exact),
            AnchorDescriptor::Aria { role, name } => st.doc.find_role(role, name),
            AnchorDescriptor::CssWithText { selector, text } => st
                .select_css(selector)?
                .into_iter()
                .filter(|id| contains_ci(&st.doc.text(*id), text))
                .collect(),
        };
        debug!(anchor = %anchor, matches = ids.len(), "fixture query");

        Ok(ids
            .into_iter()
            .map(|node| {
                Arc::new(FakeElement {
                    state: Arc::clone(&self.state),
                    node,
                    generation: st.generation,
                    label: st.doc.node(node).describe(),
                }) as ElementRef
            })
            .collect())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        let st = self.state.lock();
        st.ensure_open()?;
        if st.fail_screenshots {
            return Err(DriverError::Protocol("screenshot capture failed".to_string()));
        }
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(st.url.as_bytes());
        Ok(bytes)
    }

    async fn html(&self) -> Result<String, DriverError> {
        let st = self.state.lock();
        st.ensure_open()?;
        Ok(st.doc.to_html())
    }

    async fn drain_events(&self) -> Vec<PageEvent> {
        std::mem::take(&mut self.state.lock().events)
    }

    async fn close(&self) -> Result<(), DriverError> {
        let mut st = self.state.lock();
        st.closed = true;
        st.events.clear();
        Ok(())
    }
}

/// Handle onto one fixture node, pinned to the render generation it was
/// queried in.
pub struct FakeElement {
    state: Arc<Mutex<PageState>>,
    node: usize,
    generation: u64,
    label: String,
}

impl FakeElement {
    fn with_node<R>(
        &self,
        f: impl FnOnce(&mut PageState, usize) -> Result<R, DriverError>,
    ) -> Result<R, DriverError> {
        let mut st = self.state.lock();
        st.ensure_open()?;
        if st.generation != self.generation {
            return Err(DriverError::StaleElement(format!(
                "{} is no longer attached to the DOM",
                self.label
            )));
        }
        f(&mut *st, self.node)
    }

    fn interactable(&self, st: &PageState, id: usize) -> Result<(), DriverError> {
        if !st.doc.is_visible(id) {
            return Err(DriverError::NotInteractable(format!(
                "{} is not visible",
                self.label
            )));
        }
        if !st.doc.is_enabled(id) {
            return Err(DriverError::NotInteractable(format!(
                "{} is disabled",
                self.label
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ElementHandle for FakeElement {
    fn describe(&self) -> String {
        self.label.clone()
    }

    async fn is_visible(&self) -> Result<bool, DriverError> {
        self.with_node(|st, id| Ok(st.doc.is_visible(id)))
    }

    async fn is_enabled(&self) -> Result<bool, DriverError> {
        self.with_node(|st, id| Ok(st.doc.is_enabled(id)))
    }

    async fn text(&self) -> Result<String, DriverError> {
        self.with_node(|st, id| Ok(st.doc.text(id)))
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError> {
        let name = name.to_ascii_lowercase();
        self.with_node(|st, id| Ok(st.doc.node(id).attr(&name).map(str::to_string)))
    }

    async fn input_value(&self) -> Result<String, DriverError> {
        self.with_node(|st, id| {
            let node = st.doc.node(id);
            if node.is_form_control() {
                Ok(node.value.clone())
            } else {
                Err(DriverError::NotInteractable(format!(
                    "{} is not a form control",
                    self.label
                )))
            }
        })
    }

    async fn validation_message(&self) -> Result<Option<String>, DriverError> {
        self.with_node(|st, id| Ok(st.doc.node(id).validation.clone()))
    }

    async fn scroll_into_view(&self) -> Result<(), DriverError> {
        self.with_node(|_, _| Ok(()))
    }

    async fn click(&self) -> Result<(), DriverError> {
        self.with_node(|st, id| {
            self.interactable(st, id)?;
            let node = st.doc.node_mut(id);
            node.clicks += 1;
            if node.fail_clicks > 0 {
                node.fail_clicks -= 1;
                return Err(DriverError::NotInteractable(format!(
                    "click on {} intercepted by another element",
                    self.label
                )));
            }

            let mut effects = node.on_click.clone();
            if effects.is_empty() && node.tag == "a" {
                if let Some(href) = node.attr("href") {
                    effects.push(ClickEffect::Navigate(href.to_string()));
                }
            }
            for effect in &effects {
                st.apply(effect);
            }
            Ok(())
        })
    }

    async fn fill(&self, value: &str) -> Result<(), DriverError> {
        self.with_node(|st, id| {
            self.interactable(st, id)?;
            let node = st.doc.node_mut(id);
            if !matches!(node.tag.as_str(), "input" | "textarea") {
                return Err(DriverError::NotInteractable(format!(
                    "{} is not an <input> or <textarea>",
                    self.label
                )));
            }
            if node.has_attr("readonly") {
                return Err(DriverError::NotInteractable(format!(
                    "{} is read-only",
                    self.label
                )));
            }

            if node.tag == "input" && node.input_type() == "number" {
                match number_violation(node.attr("min"), node.attr("max"), value) {
                    Some(message) => node.validation = Some(message),
                    None => {
                        node.value = value.to_string();
                        node.validation = None;
                    }
                }
                return Ok(());
            }

            let limit = node.attr("maxlength").and_then(|m| m.parse::<usize>().ok());
            node.value = match limit {
                Some(max) => value.chars().take(max).collect(),
                None => value.to_string(),
            };
            node.validation = None;
            Ok(())
        })
    }

    async fn select_option(&self, value: &str) -> Result<(), DriverError> {
        self.with_node(|st, id| {
            self.interactable(st, id)?;
            if st.doc.node(id).tag != "select" {
                return Err(DriverError::NotInteractable(format!(
                    "{} is not a <select>",
                    self.label
                )));
            }
            let found = st.doc.node(id).children.iter().any(|child| {
                st.doc.node(*child).tag == "option" && st.doc.option_value(*child) == value
            });
            if !found {
                return Err(DriverError::NotInteractable(format!(
                    "{} has no option with value '{}'",
                    self.label, value
                )));
            }
            st.doc.node_mut(id).value = value.to_string();
            Ok(())
        })
    }

    async fn hover(&self) -> Result<(), DriverError> {
        self.with_node(|st, id| self.interactable(st, id))
    }
}

/// Constraint-validation message for a number input, `None` when accepted.
fn number_violation(min: Option<&str>, max: Option<&str>, value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }
    let Ok(number) = value.trim().parse::<f64>() else {
        return Some("Please enter a number.".to_string());
    };
    if let Some(min) = min.and_then(|m| m.parse::<f64>().ok()) {
        if number < min {
            return Some(format!("Value must be greater than or equal to {}.", min));
        }
    }
    if let Some(max) = max.and_then(|m| m.parse::<f64>().ok()) {
        if number > max {
            return Some(format!("Value must be less than or equal to {}.", max));
        }
    }
    None
}

/// [`BrowserFactory`] handing out fresh fixture pages.
pub struct FakeBrowser {
    build: Box<dyn Fn() -> FakePage + Send + Sync>,
    opened: Mutex<Vec<FakePage>>,
}

impl FakeBrowser {
    pub fn new(build: impl Fn() -> FakePage + Send + Sync + 'static) -> Self {
        Self {
            build: Box::new(build),
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Every page opened so far, in order.
    pub fn opened(&self) -> Vec<FakePage> {
        self.opened.lock().clone()
    }
}

#[async_trait]
impl BrowserFactory for FakeBrowser {
    async fn open_page(&self) -> Result<PageRef, DriverError> {
        let page = (self.build)();
        self.opened.lock().push(page.clone());
        Ok(page.driver())
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_form() -> FakePage {
        FakePage::at(
            "https://shop.test/us/products/tee",
            Node::new("body")
                .child(
                    Node::new("input")
                        .attr("type", "number")
                        .attr("min", "1")
                        .value("1"),
                )
                .child(Node::new("textarea").attr("maxlength", "5"))
                .child(Node::new("input").attr("name", "code").attr("readonly", ""))
                .child(
                    Node::new("a")
                        .attr("href", "/us/cart")
                        .text("Cart")
                        .fail_clicks(1),
                ),
        )
    }

    async fn first(page: &FakePage, css: &str) -> ElementRef {
        page.query_all(&AnchorDescriptor::css(css))
            .await
            .unwrap()
            .remove(0)
    }

    #[tokio::test]
    async fn number_input_rejects_out_of_range_values() {
        let page = product_form();
        let qty = first(&page, "input[type=number]").await;

        qty.fill("2").await.unwrap();
        assert_eq!(qty.input_value().await.unwrap(), "2");
        assert_eq!(qty.validation_message().await.unwrap(), None);

        qty.fill("-1").await.unwrap();
        assert_eq!(qty.input_value().await.unwrap(), "2");
        assert!(qty
            .validation_message()
            .await
            .unwrap()
            .unwrap()
            .contains("greater than or equal to 1"));
    }

    #[tokio::test]
    async fn maxlength_truncates_and_readonly_refuses() {
        let page = product_form();
        let area = first(&page, "textarea").await;
        area.fill("abcdefgh").await.unwrap();
        assert_eq!(area.input_value().await.unwrap(), "abcde");

        let code = first(&page, "input[name=code]").await;
        assert!(matches!(
            code.fill("x").await,
            Err(DriverError::NotInteractable(_))
        ));
    }

    #[tokio::test]
    async fn select_picks_options_by_value_only() {
        let page = FakePage::new(
            Node::new("body").child(
                Node::new("select")
                    .attr("name", "deliveryMethod")
                    .value("std")
                    .child(Node::new("option").attr("value", "std").text("Standard"))
                    .child(Node::new("option").attr("value", "exp").text("Express"))
                    .child(Node::new("option").text("Pickup")),
            ),
        );
        let select = first(&page, "select").await;

        select.select_option("exp").await.unwrap();
        assert_eq!(select.input_value().await.unwrap(), "exp");
        select.select_option("Pickup").await.unwrap();
        assert_eq!(select.input_value().await.unwrap(), "Pickup");

        assert!(matches!(
            select.select_option("Express").await,
            Err(DriverError::NotInteractable(_))
        ));
        assert_eq!(page.value_of("select"), Some("Pickup".to_string()));
        let textarea = first(&product_form(), "textarea").await;
        assert!(textarea.select_option("x").await.is_err());
    }

    #[tokio::test]
    async fn rerender_makes_handles_stale() {
        let page = product_form();
        let area = first(&page, "textarea").await;
        page.rerender();
        assert!(matches!(
            area.text().await,
            Err(DriverError::StaleElement(_))
        ));
        let fresh = first(&page, "textarea").await;
        assert!(fresh.is_visible().await.unwrap());
    }

    #[tokio::test]
    async fn failing_clicks_then_link_navigation() {
        let page = product_form();
        let link = first(&page, "a").await;
        assert!(link.click().await.is_err());
        link.click().await.unwrap();
        assert_eq!(page.url(), "/us/cart");
        assert_eq!(page.click_count("a"), 2);
    }

    #[tokio::test]
    async fn xpath_is_an_invalid_selector_and_close_is_final() {
        let page = product_form();
        let err = page
            .query_all(&AnchorDescriptor::xpath("//a"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, DriverError::InvalidSelector(_)));

        page.close().await.unwrap();
        assert!(matches!(page.screenshot().await, Err(DriverError::Closed(_))));
        assert!(matches!(page.html().await, Err(DriverError::Closed(_))));
    }
}
