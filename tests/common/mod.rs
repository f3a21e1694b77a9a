//! Fixture storefront shared by the integration tests

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use dom_fixture::{ClickEffect, FakePage, Node};
use storefront_core_types::ExecCtx;
use storefront_e2e::config::SuiteConfig;
use storefront_e2e::scenario::ScenarioContext;

pub const BASE: &str = "https://shop.test/us";
pub const PRODUCT_URL: &str = "https://shop.test/us/products/bella-3001";
pub const PRODUCTS_URL: &str = "https://shop.test/us/products";
pub const CART_URL: &str = "https://shop.test/us/cart";
pub const SUPPORT_URL: &str = "https://shop.test/us/support";
pub const SERVICE_URL: &str = "https://shop.test/us/service";
pub const SEARCH_URL: &str = "https://shop.test/us/search";
pub const CHECKOUT_URL: &str = "https://shop.test/us/checkout?checkout=Q2hlY2tvdXQ6MQ";
pub const ORDERS_URL: &str = "https://shop.test/us/orders";
pub const STANDARD_SHIPPING: &str = "U2hpcHBpbmdNZXRob2Q6MTA=";
pub const LOGIN_URL: &str = "https://auth.shop.test/login";
pub const SIGN_IN_URL: &str =
    "https://auth.shop.test/realms/shop/protocol/openid-connect/auth?client_id=storefront";
pub const MAIL_URL: &str = "https://mail.test/inboxes";

pub const TITLE_CLASSES: &str = "hidden md:flex break-words leading-tight transition-all duration-200 md:mb-4 text-[32px] lg:text-4xl font-bold tracking-tight";

/// Suite configuration pointed at the fixture site with short budgets.
pub fn test_config(dir: &Path) -> SuiteConfig {
    let mut config = SuiteConfig::default();
    config.site.base_url = BASE.to_string();
    config.site.products_url = PRODUCTS_URL.to_string();
    config.site.cart_url = CART_URL.to_string();
    config.site.support_url = SUPPORT_URL.to_string();
    config.site.service_url = SERVICE_URL.to_string();
    config.site.search_url = SEARCH_URL.to_string();
    config.site.orders_url = ORDERS_URL.to_string();
    config.site.login_url = LOGIN_URL.to_string();
    config.site.mailinator_url = MAIL_URL.to_string();
    config.artifacts.dir = dir.join("artifacts");
    config.report.dir = dir.join("results");
    config.timeouts.step_ms = 10_000;
    config.timeouts.navigation_ms = 2_000;
    config.timeouts.resolve_ms = 300;
    config.timeouts.poll_interval_ms = 20;
    config.retry.attempts = 2;
    config.retry.per_attempt_ms = 300;
    config.retry.backoff_base_ms = 10;
    config.retry.backoff_cap_ms = 20;
    config
}

pub fn context(page: &FakePage, config: SuiteConfig) -> ScenarioContext {
    ScenarioContext::new(
        "fixture scenario",
        page.driver(),
        Arc::new(config),
        ExecCtx::with_budget(Duration::from_secs(20)),
    )
}

fn swatch(color: &str, hex: &str) -> Node {
    Node::new("button")
        .class("rounded-full h-8 w-8 border")
        .attr("title", color)
        .attr("style", format!("background-color: {}", hex))
}

fn size(label: &str) -> Node {
    Node::new("button").attr("title", label).text(label)
}

pub fn product_detail(with_swatches: bool) -> Node {
    let mut options = Node::new("div").class("flex flex-wrap gap-2");
    if with_swatches {
        options = options.children([swatch("Black", "#000000"), swatch("Heather Navy", "#2c3e50")]);
    }
    let sizes = Node::new("div")
        .class("flex flex-wrap gap-2")
        .children([size("S"), size("M"), size("L")]);

    Node::new("main").children([
        Node::new("h1")
            .class(TITLE_CLASSES)
            .text("Bella + Canvas 3001 Unisex Jersey Tee"),
        Node::new("div")
            .class("relative aspect-square w-full")
            .child(
                Node::new("img")
                    .attr("src", "https://cdn.shop.test/bella-3001.jpg")
                    .attr("alt", "Bella tee"),
            ),
        Node::new("div")
            .class("ml-2 text-3xl font-extrabold text-black")
            .text("$12.50"),
        options,
        sizes,
        Node::new("input")
            .attr("type", "number")
            .attr("name", "quantity")
            .attr("min", "1")
            .attr("max", "99")
            .value("1"),
        Node::new("button")
            .id("add-to-cart-button")
            .text("Add to Cart")
            .on_click(ClickEffect::Navigate(SIGN_IN_URL.to_string())),
    ])
}

/// Header links shared by the storefront pages; deliberately not a `<nav>`.
pub fn site_header() -> Node {
    Node::new("header").children([
        Node::new("a").attr("href", BASE).text("Home"),
        Node::new("a").attr("href", PRODUCTS_URL).text("Order"),
        Node::new("a").attr("href", SERVICE_URL).text("Service"),
    ])
}

pub fn products_listing() -> Node {
    Node::new("main").children([
        site_header(),
        Node::new("nav").children([
            Node::new("a").attr("href", BASE).text("Home"),
            Node::new("span").text("/"),
            Node::new("span").text("Products"),
        ]),
        Node::new("div").attr("data-testid", "ProductElement").children([
            Node::new("a")
                .attr("href", PRODUCT_URL)
                .child(Node::new("h3").text("Bella Tee")),
            Node::new("p")
                .attr("data-testid", "ProductElement_PriceRange")
                .text("From: $12.50 - $14.00"),
        ]),
    ])
}

fn cart_item(position: usize, name: &str, price: &str) -> Node {
    Node::new("li").class("flex gap-x-2").children([
        Node::new("p").text(name),
        Node::new("p").text(price),
        Node::new("input").attr("type", "number").attr("min", "1").value("1"),
        Node::new("button").child(
            Node::new("span")
                .text("Delete")
                .on_click(ClickEffect::Hide(format!("li.flex.gap-x-2:nth-child({})", position))),
        ),
    ])
}

pub fn cart() -> Node {
    Node::new("main").children([
        Node::new("ul").children([
            cart_item(1, "Bella Tee", "$12.50"),
            cart_item(2, "Gildan Hoodie", "$17.50"),
        ]),
        Node::new("div").child(Node::new("p").text("Subtotal: $30.00")),
        Node::new("div").class("font-medium text-neutral-900").text("$30.00"),
        Node::new("button")
            .text("Checkout")
            .on_click(ClickEffect::Navigate(CHECKOUT_URL.to_string())),
    ])
}

pub fn checkout() -> Node {
    Node::new("main").children([
        Node::new("select")
            .attr("name", "deliveryMethod")
            .children([
                Node::new("option").attr("value", "").text("Choose a method"),
                Node::new("option")
                    .attr("value", STANDARD_SHIPPING)
                    .text("Standard"),
                Node::new("option")
                    .attr("value", "U2hpcHBpbmdNZXRob2Q6MTE=")
                    .text("Express"),
            ]),
        Node::new("p").attr("data-testid", "totalOrderPrice").text("$30.00"),
        Node::new("p").attr("data-testid", "totalOrderPrice").text("$35.99"),
        Node::new("button")
            .text("Place Order")
            .on_click(ClickEffect::Navigate(ORDERS_URL.to_string())),
    ])
}

/// Results page url for `keyword`, encoded the way the suite builds it.
pub fn search_url(keyword: &str) -> String {
    url::Url::parse_with_params(SEARCH_URL, &[("query", keyword)])
        .unwrap()
        .to_string()
}

/// Header search whose submit lands on the results for `keyword`.
pub fn search_form(keyword: &str) -> Node {
    Node::new("form").children([
        Node::new("input")
            .attr("type", "text")
            .attr("placeholder", "Search for products..."),
        Node::new("button")
            .attr("type", "submit")
            .text("Search")
            .on_click(ClickEffect::Navigate(search_url(keyword))),
    ])
}

pub fn home_page(keyword: &str) -> Node {
    Node::new("main").children([
        Node::new("a")
            .attr("href", BASE)
            .child(
                Node::new("img")
                    .attr("alt", "SwiftPod Logo")
                    .attr("src", "https://cdn.shop.test/logo.svg")
                    .on_click(ClickEffect::Navigate(BASE.to_string())),
            ),
        site_header(),
        search_form(keyword),
        Node::new("button")
            .text("Log in")
            .on_click(ClickEffect::Navigate(SIGN_IN_URL.to_string())),
        Node::new("h1").text("Welcome to ZoomPrints"),
        Node::new("section").children(
            ["Best Quality", "Secure Payment", "Professional", "Competitive Pricing"]
                .map(|feature| Node::new("h3").text(feature)),
        ),
    ])
}

/// Results for `keyword`; no product names renders the empty state.
pub fn search_results(keyword: &str, products: &[&str]) -> Node {
    let body = if products.is_empty() {
        Node::new("div").children([
            Node::new("h1").text("No results found"),
            Node::new("p")
                .class("text-gray-500")
                .text(format!("We couldn't find any matches for \"{}\"", keyword)),
        ])
    } else {
        Node::new("div").children([
            Node::new("h1").text(format!("Search results for \"{}\"", keyword)),
            Node::new("ul").attr("data-testid", "ProductList").children(
                products.iter().map(|name| {
                    Node::new("li")
                        .attr("data-testid", "ProductElement")
                        .child(Node::new("h3").text(*name))
                }),
            ),
        ])
    };
    Node::new("main").children([search_form(keyword), body])
}

fn service_card(name: &str, highlights: &[&str]) -> Node {
    let slug = name.to_lowercase().replace(' ', "-");
    Node::new("div").class("rounded-xl").children([
        Node::new("img")
            .attr("alt", name)
            .attr("src", format!("https://cdn.shop.test/{}.jpg", slug.replace('-', "_"))),
        Node::new("h2").text(name),
        Node::new("ul").children(
            highlights
                .iter()
                .map(|line| Node::new("li").child(Node::new("span").text(*line))),
        ),
        Node::new("a")
            .attr("href", format!("{}/{}", SERVICE_URL, slug))
            .text("Learn More"),
    ])
}

pub fn service_page() -> Node {
    use storefront_e2e::storefront::SERVICES;

    Node::new("main").children([
        Node::new("nav").children([
            Node::new("a").attr("href", BASE).text("Home"),
            Node::new("a").attr("href", PRODUCTS_URL).text("Order"),
            Node::new("a").attr("href", SERVICE_URL).text("Service"),
        ]),
        Node::new("h1").text("Services"),
        Node::new("button").text("Explore Services"),
        Node::new("div").class("grid").children(
            SERVICES
                .iter()
                .map(|offering| service_card(offering.name, offering.highlights)),
        ),
    ])
}

fn support_input(name: &str) -> Node {
    Node::new("input").attr("name", name)
}

/// Support form whose submit reveals the confirmation or the length error.
pub fn support_form(accepts: bool) -> Node {
    let outcome = if accepts { "#support-created" } else { "#support-error" };
    Node::new("main").children([
        Node::new("form").class("w-full max-w-2xl").children([
            support_input("firstName"),
            support_input("lastName"),
            support_input("email"),
            support_input("phoneNumber"),
            support_input("company"),
            support_input("address"),
            Node::new("textarea").attr("name", "details"),
            Node::new("button")
                .attr("type", "submit")
                .text("Send")
                .on_click(ClickEffect::Reveal(outcome.to_string())),
        ]),
        Node::new("p")
            .id("support-created")
            .text("Support request created successfully")
            .hidden(),
        Node::new("p")
            .id("support-error")
            .text("Error creating support request: value too long for type character varying(255)")
            .hidden(),
    ])
}

/// One page that serves the whole fixture site by url.
pub fn storefront() -> FakePage {
    FakePage::new(Node::new("main"))
        .with_route(BASE, home_page("Gildan"))
        .with_route(SERVICE_URL, service_page())
        .with_route(search_url("Gildan"), search_results("Gildan", &["Gildan 5000 Heavy Cotton Tee"]))
        .with_route(CHECKOUT_URL, checkout())
        .with_route(ORDERS_URL, Node::new("main").child(Node::new("h1").text("Orders")))
        .with_route(PRODUCT_URL, product_detail(true))
        .with_route(PRODUCTS_URL, products_listing())
        .with_route(CART_URL, cart())
        .with_route(SUPPORT_URL, support_form(true))
        .with_route(SIGN_IN_URL, Node::new("main").child(Node::new("h1").text("Sign in")))
}
