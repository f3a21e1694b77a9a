mod common;

use dom_fixture::{ClickEffect, FakePage, Node};
use serde_json::json;
use storefront_e2e::config::PageSpeedConfig;
use storefront_e2e::services::{MailInbox, PageSpeedClient, Strategy};
use storefront_e2e::SuiteError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

const INBOX: &str = "https://mail.test/inboxes?to=test20260101090000000";
const MESSAGE: &str = "https://mail.test/msg/7";
const MESSAGE_BODY: &str = "https://mail.test/msg/7/body";

fn inbox_list(subject: &str) -> Node {
    let row = Node::new("tr").children([
        Node::new("td").text("Keycloak"),
        Node::new("td").text("just now"),
        Node::new("td")
            .text(subject)
            .on_click(ClickEffect::Navigate(MESSAGE.to_string())),
    ]);
    Node::new("main").child(
        Node::new("table")
            .class("table")
            .child(Node::new("tbody").child(row)),
    )
}

fn mail_site(subject: &str) -> FakePage {
    FakePage::new(Node::new("main"))
        .with_route(INBOX, inbox_list(subject))
        .with_route(
            MESSAGE,
            Node::new("main").child(
                Node::new("iframe")
                    .id("html_msg_body")
                    .attr("src", "/msg/7/body"),
            ),
        )
        .with_route(
            MESSAGE_BODY,
            Node::new("body").child(
                Node::new("a")
                    .attr("href", "/realms/shop/login-actions/action-token?key=abc")
                    .text("Verify email address"),
            ),
        )
}

#[tokio::test]
async fn verification_link_is_followed_through_the_message_frame() {
    let dir = tempfile::tempdir().unwrap();
    let page = mail_site("Account confirmation e-mail");
    let ctx = context(&page, test_config(dir.path()));

    let link = MailInbox::from_context(&ctx)
        .verification_link(&ctx, "test20260101090000000@mailinator.com")
        .await
        .unwrap();

    assert_eq!(
        link,
        "https://mail.test/realms/shop/login-actions/action-token?key=abc"
    );
    assert_eq!(page.url(), MESSAGE_BODY);
}

#[tokio::test]
async fn unexpected_subject_falls_back_to_the_first_message() {
    let dir = tempfile::tempdir().unwrap();
    let page = mail_site("Welcome aboard");
    let ctx = context(&page, test_config(dir.path()));

    let link = MailInbox::from_context(&ctx)
        .verification_link(&ctx, "test20260101090000000")
        .await
        .unwrap();
    assert!(link.ends_with("action-token?key=abc"));
}

#[tokio::test]
async fn empty_inbox_is_an_external_service_error() {
    let dir = tempfile::tempdir().unwrap();
    let page = FakePage::new(Node::new("main")).with_route(INBOX, Node::new("main"));
    let ctx = context(&page, test_config(dir.path()));

    let err = MailInbox::from_context(&ctx)
        .with_list_timeout(std::time::Duration::from_millis(200))
        .verification_link(&ctx, "test20260101090000000")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SuiteError::ExternalService {
            service: "mailinator",
            ..
        }
    ));
}

fn pagespeed_config(server: &MockServer) -> PageSpeedConfig {
    PageSpeedConfig {
        endpoint: format!("{}/pagespeedonline/v5/runPagespeed", server.uri()),
        api_key: Some("test-key".to_string()),
        timeout_ms: 5_000,
        ..PageSpeedConfig::default()
    }
}

#[tokio::test]
async fn pagespeed_audit_reports_low_categories() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pagespeedonline/v5/runPagespeed"))
        .and(query_param("url", BASE))
        .and(query_param("strategy", "mobile"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lighthouseResult": {
                "categories": {
                    "performance": { "score": 0.42 },
                    "accessibility": { "score": 0.97 },
                    "best-practices": { "score": 0.91 },
                    "seo": { "score": 0.88 }
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = PageSpeedClient::new(&pagespeed_config(&server)).unwrap();
    let report = client.audit(BASE, Strategy::Mobile).await.unwrap();

    assert!(!report.passed());
    assert_eq!(report.below_threshold, vec!["performance"]);
    assert_eq!(report.score("accessibility"), Some(0.97));
}

#[tokio::test]
async fn pagespeed_http_errors_name_the_service() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let client = PageSpeedClient::new(&pagespeed_config(&server)).unwrap();
    match client.audit(BASE, Strategy::Desktop).await.unwrap_err() {
        SuiteError::ExternalService { service, message } => {
            assert_eq!(service, "pagespeed");
            assert!(message.contains("429"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}
