//! Resend adapter tests.

use mailroom::providers::ResendProvider;
use mailroom::{EmailOptions, EmailProvider, Env, ProviderConfig};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn valid_email() -> EmailOptions {
    EmailOptions::new()
        .from("tony.stark@example.com")
        .to("steve.rogers@example.com")
        .subject("Hello, Avengers!")
        .html("<h1>Hello</h1>")
        .text("Hello")
}

fn success_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "049b9217-30b5-4f61-a8e3-4d2d12f9f5a7"
    }))
}

// ============================================================================
// Delivery
// ============================================================================

#[tokio::test]
async fn successful_delivery_returns_id() {
    let server = MockServer::start().await;
    let provider = ResendProvider::new("re_123456789").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("Authorization", "Bearer re_123456789"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "from": "tony.stark@example.com",
            "to": ["steve.rogers@example.com"],
            "subject": "Hello, Avengers!",
            "html": "<h1>Hello</h1>",
            "text": "Hello"
        })))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    let response = provider.send_email(&valid_email()).await;
    assert!(response.success);
    assert_eq!(response.provider, "resend");
    assert_eq!(
        response.id.as_deref(),
        Some("049b9217-30b5-4f61-a8e3-4d2d12f9f5a7")
    );
    assert!(response.error.is_none());
}

#[tokio::test]
async fn text_only_delivery_omits_html() {
    let server = MockServer::start().await;
    let provider = ResendProvider::new("re_123456789").base_url(server.uri());

    let email = EmailOptions::new()
        .from("tony.stark@example.com")
        .to("steve.rogers@example.com")
        .subject("Hello, Avengers!")
        .text("Hello");

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(body_json(json!({
            "from": "tony.stark@example.com",
            "to": ["steve.rogers@example.com"],
            "subject": "Hello, Avengers!",
            "text": "Hello"
        })))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    assert!(provider.send_email(&email).await.success);
}

#[tokio::test]
async fn deliver_with_all_fields() {
    let server = MockServer::start().await;
    let provider = ResendProvider::new("re_123456789").base_url(server.uri());

    let email = EmailOptions::new()
        .from(("T Stark", "tony.stark@example.com"))
        .to(("Steve Rogers", "steve.rogers@example.com"))
        .to("bruce.banner@example.com")
        .reply_to("hulk.smash@example.com")
        .cc(("Janet Pym", "wasp.avengers@example.com"))
        .bcc("thor.odinson@example.com")
        .subject("Hello, Avengers!")
        .html("<h1>Hello</h1>");

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(body_json(json!({
            "from": "T Stark <tony.stark@example.com>",
            "to": ["Steve Rogers <steve.rogers@example.com>", "bruce.banner@example.com"],
            "subject": "Hello, Avengers!",
            "html": "<h1>Hello</h1>",
            "cc": ["Janet Pym <wasp.avengers@example.com>"],
            "bcc": ["thor.odinson@example.com"],
            "reply_to": "hulk.smash@example.com"
        })))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    assert!(provider.send_email(&email).await.success);
}

#[tokio::test]
async fn default_from_fills_missing_sender() {
    let server = MockServer::start().await;
    let provider = ResendProvider::new("re_123456789")
        .base_url(server.uri())
        .default_from(("Avengers", "hq@example.com"));

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(body_json(json!({
            "from": "Avengers <hq@example.com>",
            "to": ["steve.rogers@example.com"],
            "subject": "Assemble",
            "text": "Now"
        })))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    let email = EmailOptions::new()
        .to("steve.rogers@example.com")
        .subject("Assemble")
        .text("Now");
    assert!(provider.send_email(&email).await.success);
}

#[tokio::test]
async fn accepted_without_body_is_success_without_id() {
    let server = MockServer::start().await;
    let provider = ResendProvider::new("re_123456789").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider.send_email(&valid_email()).await;
    assert!(response.success, "{:?}", response.error);
    assert!(response.id.is_none());
    assert!(response.error.is_none());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn vendor_error_becomes_failed_response() {
    let server = MockServer::start().await;
    let provider = ResendProvider::new("re_123456789").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "statusCode": 422,
            "name": "validation_error",
            "message": "Invalid `to` field."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider.send_email(&valid_email()).await;
    assert!(!response.success);
    assert!(response.id.is_none());
    assert!(response.error.unwrap().contains("Invalid `to` field."));
}

#[tokio::test]
async fn unparseable_error_body_still_fails_cleanly() {
    let server = MockServer::start().await;
    let provider = ResendProvider::new("re_123456789").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let response = provider.send_email(&valid_email()).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("Unknown error"));
}

#[tokio::test]
async fn unconfigured_provider_never_calls_vendor() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(success_response())
        .expect(0)
        .mount(&server)
        .await;

    let provider = ResendProvider::from_env(
        &Env::default(),
        &ProviderConfig::new().base_url(server.uri()),
    );
    assert!(!provider.is_configured());

    let response = provider.send_email(&valid_email()).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("not configured"));
}

#[tokio::test]
async fn missing_recipients_is_a_failed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(success_response())
        .expect(0)
        .mount(&server)
        .await;

    let provider = ResendProvider::new("re_123456789").base_url(server.uri());
    let email = EmailOptions::new()
        .from("tony.stark@example.com")
        .subject("Nobody")
        .text("Hello?");

    let response = provider.send_email(&email).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("to"));
}
