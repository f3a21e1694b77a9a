//! Live Chromium checks.
//!
//! Run with:
//! ```bash
//! export STOREFRONT_USE_REAL_CHROME=1
//! export STOREFRONT_CHROME=/usr/bin/google-chrome  # optional
//! cargo test -p cdp-adapter --test live_chromium -- --nocapture
//! ```

use std::env;
use std::io::Write;

use cdp_adapter::{BrowserSettings, ChromiumLauncher};
use storefront_core_types::{AnchorDescriptor, BrowserFactory, PageEventKind};

fn should_run_real_tests() -> bool {
    env::var("STOREFRONT_USE_REAL_CHROME")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn fixture_page() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".html").tempfile().unwrap();
    write!(
        file,
        r#"<!DOCTYPE html><html><head><title>Fixture</title></head><body>
        <h1 class="md:flex">Jersey Tee</h1>
        <button id="add" aria-label="Add to Cart">Add to Cart</button>
        <button hidden>Ghost</button>
        <input type="number" min="1" name="quantity" value="1">
        <script>console.log("ready");</script>
        </body></html>"#
    )
    .unwrap();
    file
}

#[tokio::test]
async fn queries_state_and_events_against_real_chromium() {
    if !should_run_real_tests() {
        println!("Skipping real browser test (STOREFRONT_USE_REAL_CHROME not set)");
        return;
    }

    let fixture = fixture_page();
    let launcher = ChromiumLauncher::new(BrowserSettings {
        headless: true,
        no_sandbox: true,
        ..BrowserSettings::default()
    });
    let page = launcher.open_page().await.expect("launch chromium");
    page.goto(&format!("file://{}", fixture.path().display()))
        .await
        .unwrap();

    assert_eq!(page.title().await.unwrap(), "Fixture");
    let titles = page
        .query_all(&AnchorDescriptor::css(r"h1.md\:flex"))
        .await
        .unwrap();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0].text().await.unwrap(), "Jersey Tee");

    let buttons = page
        .query_all(&AnchorDescriptor::aria("button", "Add to Cart"))
        .await
        .unwrap();
    assert_eq!(buttons.len(), 1);
    assert!(buttons[0].is_visible().await.unwrap());

    let ghost = page
        .query_all(&AnchorDescriptor::exact_text("Ghost"))
        .await
        .unwrap();
    assert!(!ghost[0].is_visible().await.unwrap());

    let quantity = page
        .query_all(&AnchorDescriptor::css("input[name='quantity']"))
        .await
        .unwrap();
    quantity[0].fill("-1").await.unwrap();
    assert!(quantity[0].validation_message().await.unwrap().is_some());

    let events = page.drain_events().await;
    assert!(events
        .iter()
        .any(|e| matches!(&e.kind, PageEventKind::Console { text, .. } if text == "ready")));

    page.close().await.unwrap();
    assert!(page.current_url().await.is_err());
}
