mod common;

use action_locator::ResolutionResult;
use action_primitives::Verdict;
use dom_fixture::{FakePage, Node};
use storefront_e2e::storefront::products::in_order;
use storefront_e2e::storefront::support::{Submission, FIELD_LIMIT};
use storefront_e2e::storefront::{
    CartPage, CheckoutPage, HomePage, ProductDetailPage, ProductsPage, SearchOutcome,
    SearchResultsPage, ServicePage, SupportPage, SupportRequest, SERVICES,
};
use storefront_snapshot_store::list_artifacts;

use common::*;

#[tokio::test]
async fn product_title_resolves_on_the_most_specific_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let page = storefront();
    let ctx = context(&page, test_config(dir.path()));
    let detail = ProductDetailPage::new(&ctx);
    detail.open("bella-3001").await.unwrap();

    let result = ctx.resolve(&ProductDetailPage::title_target()).await.unwrap();
    assert_eq!(result.candidate_index(), Some(0));
    assert_eq!(
        detail.title().await.unwrap(),
        "Bella + Canvas 3001 Unisex Jersey Tee"
    );
}

#[tokio::test]
async fn quantity_round_trips_and_refuses_negative_values() {
    let dir = tempfile::tempdir().unwrap();
    let page = storefront();
    let ctx = context(&page, test_config(dir.path()));
    let detail = ProductDetailPage::new(&ctx);
    detail.open("bella-3001").await.unwrap();

    assert_eq!(detail.set_quantity("2").await.unwrap(), Verdict::Applied);
    assert_eq!(detail.quantity().await.unwrap(), "2");

    match detail.set_quantity("-1").await.unwrap() {
        Verdict::RejectedByUi { observed, reason } => {
            assert_eq!(observed, "2");
            assert!(reason.contains("greater than or equal to 1"), "{reason}");
        }
        other => panic!("negative quantity accepted: {other:?}"),
    }
    assert_eq!(page.value_of(r#"input[type="number"]"#).as_deref(), Some("2"));
}

#[tokio::test]
async fn missing_swatches_end_in_a_miss_with_one_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let page = FakePage::at(PRODUCT_URL, product_detail(false));
    let config = test_config(dir.path());
    let artifacts = config.artifacts.dir.clone();
    let ctx = context(&page, config);

    let result = ctx
        .resolve(&ProductDetailPage::color_swatches_target())
        .await
        .unwrap();
    match result {
        ResolutionResult::NotFound { tried, diagnostics } => {
            assert_eq!(tried.len(), 1);
            assert!(!diagnostics.is_empty());
        }
        ResolutionResult::Found(found) => panic!("unexpected swatch: {}", found.anchor),
    }

    let written = list_artifacts(&artifacts).unwrap();
    assert!(!written.is_empty());
    assert!(written
        .iter()
        .all(|a| a.file_name().contains("color-options-debug")));

    let colors = ProductDetailPage::new(&ctx).color_options().await.unwrap();
    assert!(colors.is_empty());
}

#[tokio::test]
async fn colour_and_size_options_skip_each_other() {
    let dir = tempfile::tempdir().unwrap();
    let page = FakePage::at(PRODUCT_URL, product_detail(true));
    let ctx = context(&page, test_config(dir.path()));
    let detail = ProductDetailPage::new(&ctx);

    assert_eq!(
        detail.color_options().await.unwrap(),
        vec!["Black", "Heather Navy"]
    );
    assert_eq!(detail.size_options().await.unwrap(), vec!["S", "M", "L"]);
    assert_eq!(detail.select_size("M").await.unwrap(), Verdict::Completed);
    assert_eq!(page.click_count(r#"button[title="M"]"#), 1);
    assert_eq!(detail.price().await.unwrap(), Some(12.5));
    assert!(detail.has_product_image().await.unwrap());
}

#[tokio::test]
async fn guest_add_to_cart_lands_on_sign_in() {
    let dir = tempfile::tempdir().unwrap();
    let page = storefront();
    let ctx = context(&page, test_config(dir.path()));
    let detail = ProductDetailPage::new(&ctx);
    detail.open("bella-3001").await.unwrap();

    let verdict = detail.add_to_cart_expecting_sign_in().await.unwrap();
    assert_eq!(verdict, Verdict::ConditionMet);
    assert_eq!(page.url(), SIGN_IN_URL);
}

#[tokio::test]
async fn breadcrumb_reads_in_order_and_home_navigates() {
    let dir = tempfile::tempdir().unwrap();
    let page = storefront();
    let ctx = context(&page, test_config(dir.path()));
    let products = ProductsPage::new(&ctx);
    products.open().await.unwrap();

    let items = products.breadcrumb_items().await.unwrap();
    assert!(in_order(&items, &["Home", "Products"]), "{items:?}");
    assert!(products.has_breadcrumb_label("Products").await.unwrap());
    assert_eq!(products.product_names().await.unwrap(), vec!["Bella Tee"]);
    assert_eq!(
        products.first_price_range().await.unwrap().as_deref(),
        Some("From: $12.50 - $14.00")
    );

    assert_eq!(products.click_home().await.unwrap(), BASE);
}

#[tokio::test]
async fn cart_totals_and_removal() {
    let dir = tempfile::tempdir().unwrap();
    let page = storefront();
    let ctx = context(&page, test_config(dir.path()));
    let cart = CartPage::new(&ctx);
    cart.open().await.unwrap();

    assert_eq!(cart.item_count().await.unwrap(), 2);
    assert_eq!(cart.item_prices().await.unwrap(), vec![12.5, 17.5]);
    assert_eq!(cart.subtotal().await.unwrap(), Some(30.0));
    assert_eq!(cart.change_quantity(1, 3).await.unwrap(), Verdict::Applied);

    cart.remove_item(0).await.unwrap();
    assert_eq!(cart.item_count().await.unwrap(), 1);
    assert_eq!(cart.item_prices().await.unwrap(), vec![17.5]);

    cart.clear().await.unwrap();
    assert!(cart.is_empty().await.unwrap());
}

#[tokio::test]
async fn support_form_reports_both_outcomes() {
    let dir = tempfile::tempdir().unwrap();

    let accepting = FakePage::at(SUPPORT_URL, support_form(true)).with_route(SUPPORT_URL, support_form(true));
    let ctx = context(&accepting, test_config(dir.path()));
    let support = SupportPage::new(&ctx);
    support.open().await.unwrap();
    let request = SupportRequest {
        first_name: Some("A".repeat(FIELD_LIMIT)),
        ..SupportRequest::complete()
    };
    let verdicts = support.fill(&request).await.unwrap();
    assert_eq!(verdicts.len(), 7);
    assert!(verdicts.iter().all(|(_, v)| *v == Verdict::Applied));
    assert_eq!(support.submit().await.unwrap(), Submission::Created);

    let rejecting = FakePage::at(SUPPORT_URL, support_form(false)).with_route(SUPPORT_URL, support_form(false));
    let ctx = context(&rejecting, test_config(dir.path()));
    let support = SupportPage::new(&ctx);
    support.open().await.unwrap();
    support
        .fill(&SupportRequest {
            first_name: Some("A".repeat(FIELD_LIMIT + 1)),
            ..SupportRequest::complete()
        })
        .await
        .unwrap();
    match support.submit().await.unwrap() {
        Submission::Rejected(message) => assert!(message.contains("too long"), "{message}"),
        other => panic!("long first name accepted: {other:?}"),
    }
}

#[tokio::test]
async fn service_page_lists_cards_in_order_and_navigates() {
    let dir = tempfile::tempdir().unwrap();
    let page = storefront();
    let ctx = context(&page, test_config(dir.path()));
    let service = ServicePage::new(&ctx);
    service.open().await.unwrap();

    assert!(service.has_heading().await.unwrap());
    assert!(service.has_explore_button().await.unwrap());
    let expected: Vec<_> = SERVICES.iter().map(|s| s.name.to_string()).collect();
    assert_eq!(service.service_titles().await.unwrap(), expected);

    let card = service.card("Direct-To-Garment").await.unwrap();
    assert_eq!(
        card.image_src.as_deref(),
        Some("https://cdn.shop.test/direct_to_garment.jpg")
    );
    assert_eq!(card.highlights.len(), 3);
    assert!(card.missing_highlights(SERVICES[1].highlights).is_empty());

    let hrefs = service.learn_more_hrefs().await.unwrap();
    assert_eq!(hrefs.len(), SERVICES.len());
    assert!(hrefs.iter().all(|href| href.contains("service")), "{hrefs:?}");

    assert_eq!(service.hover_nav("Service").await.unwrap(), Verdict::Completed);
    assert_eq!(service.follow_nav("Order", "products").await.unwrap(), PRODUCTS_URL);
    // The products page only offers the header link.
    assert_eq!(service.follow_nav("Service", "service").await.unwrap(), SERVICE_URL);
}

#[tokio::test]
async fn card_without_highlights_leaves_a_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let page = FakePage::at(
        SERVICE_URL,
        Node::new("main").child(
            Node::new("div")
                .class("grid")
                .child(Node::new("div").child(Node::new("h2").text("Embroidery"))),
        ),
    );
    let config = test_config(dir.path());
    let artifacts = config.artifacts.dir.clone();
    let ctx = context(&page, config);

    let card = ServicePage::new(&ctx).card("Embroidery").await.unwrap();
    assert_eq!(card.image_src, None);
    assert_eq!(
        card.missing_highlights(SERVICES[2].highlights),
        SERVICES[2].highlights.to_vec()
    );
    assert!(list_artifacts(&artifacts)
        .unwrap()
        .iter()
        .any(|a| a.file_name().contains("service-embroidery-debug")));
}

#[tokio::test]
async fn homepage_logo_features_and_login() {
    let dir = tempfile::tempdir().unwrap();
    let page = storefront();
    let ctx = context(&page, test_config(dir.path()));
    let home = HomePage::new(&ctx);
    home.open().await.unwrap();

    assert_eq!(home.click_logo().await.unwrap(), BASE);
    assert!(home.missing_features().await.unwrap().is_empty());
    assert_eq!(
        home.welcome_heading().await.unwrap().as_deref(),
        Some("Welcome to ZoomPrints")
    );

    // The styled div candidate is absent; the button fallback wins.
    let resolved = ctx.require(&HomePage::login_button_target()).await.unwrap();
    assert_eq!(resolved.candidate_index, 1);
    assert_eq!(home.open_login().await.unwrap(), Verdict::ConditionMet);
    assert_eq!(page.url(), SIGN_IN_URL);
}

#[tokio::test]
async fn header_search_reads_results_and_the_empty_state() {
    let dir = tempfile::tempdir().unwrap();
    let page = storefront();
    let ctx = context(&page, test_config(dir.path()));
    let home = HomePage::new(&ctx);
    home.open().await.unwrap();

    let outcome = home.search("Gildan").await.unwrap();
    assert!(outcome.echoes("Gildan"), "{outcome:?}");
    assert_eq!(outcome.products(), ["Gildan 5000 Heavy Cotton Tee".to_string()]);
    assert_eq!(page.url(), search_url("Gildan"));

    let misspelled = FakePage::at(BASE, home_page("T-shrit"))
        .with_route(BASE, home_page("T-shrit"))
        .with_route(search_url("T-shrit"), search_results("T-shrit", &[]));
    let ctx = context(&misspelled, test_config(dir.path()));
    let outcome = HomePage::new(&ctx).search("T-shrit").await.unwrap();
    match &outcome {
        SearchOutcome::NoResults { message } => {
            assert_eq!(message, "We couldn't find any matches for \"T-shrit\"")
        }
        other => panic!("misspelled keyword found products: {other:?}"),
    }
    assert!(outcome.echoes("T-shrit"));
}

#[tokio::test]
async fn escaped_script_payload_is_not_reflected() {
    let dir = tempfile::tempdir().unwrap();
    let payload = "<script>alert('XSS')</script>";
    let escaped = FakePage::new(Node::new("main"))
        .with_route(search_url(payload), search_results(payload, &[]));
    let ctx = context(&escaped, test_config(dir.path()));
    let results = SearchResultsPage::new(&ctx);
    results.open(payload).await.unwrap();
    assert!(results.outcome().await.unwrap().is_empty());
    assert!(!results.reflects_raw(payload).await.unwrap());

    let injected = FakePage::new(
        Node::new("main").child(Node::new("script").text("alert('XSS')")),
    );
    let ctx = context(&injected, test_config(dir.path()));
    assert!(SearchResultsPage::new(&ctx).reflects_raw(payload).await.unwrap());
}

#[tokio::test]
async fn checkout_from_cart_to_orders() {
    let dir = tempfile::tempdir().unwrap();
    let page = storefront();
    let ctx = context(&page, test_config(dir.path()));
    CartPage::new(&ctx).open().await.unwrap();
    let checkout = CheckoutPage::new(&ctx);

    assert_eq!(checkout.cart_total().await.unwrap(), Some(30.0));
    assert_eq!(checkout.proceed().await.unwrap(), CHECKOUT_URL);
    assert_eq!(checkout.choose_delivery().await.unwrap(), Verdict::Applied);
    assert_eq!(page.value_of("select").as_deref(), Some(STANDARD_SHIPPING));
    assert_eq!(checkout.order_total().await.unwrap(), Some(35.99));
    assert_eq!(checkout.place_order().await.unwrap(), ORDERS_URL);
}

#[tokio::test]
async fn unknown_delivery_method_fails_after_retries() {
    let dir = tempfile::tempdir().unwrap();
    let page = FakePage::at(CHECKOUT_URL, checkout());
    let mut config = test_config(dir.path());
    config.site.delivery_method = "pickup".to_string();
    let ctx = context(&page, config);

    let err = CheckoutPage::new(&ctx).choose_delivery().await.unwrap_err();
    assert!(
        matches!(err, storefront_e2e::errors::SuiteError::StepFailed { attempts: 2, .. }),
        "{err}"
    );
    assert_eq!(page.value_of("select").as_deref(), Some(""));
}

#[tokio::test]
async fn add_to_cart_toast_and_badge() {
    let dir = tempfile::tempdir().unwrap();
    let refused = FakePage::new(Node::new("main").children([
        Node::new("div")
            .class("Toastify__toast-body")
            .text("Could not add items: variant out of stock"),
        Node::new("div")
            .class("bg-neutral-900 text-white text-xs font-medium")
            .text("2"),
    ]));
    let ctx = context(&refused, test_config(dir.path()));
    let checkout = CheckoutPage::new(&ctx);
    let error = checkout.add_error().await.unwrap().unwrap();
    assert!(error.contains("out of stock"), "{error}");
    assert_eq!(checkout.cart_badge_count().await.unwrap(), 2);

    let quiet = FakePage::new(Node::new("main"));
    let ctx = context(&quiet, test_config(dir.path()));
    let checkout = CheckoutPage::new(&ctx);
    assert_eq!(checkout.add_error().await.unwrap(), None);
    assert_eq!(checkout.cart_badge_count().await.unwrap(), 0);
}
