//! Postmark adapter tests.

use mailroom::providers::PostmarkProvider;
use mailroom::{EmailOptions, EmailProvider, Env, ProviderConfig};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

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
        "To": "steve.rogers@example.com",
        "SubmittedAt": "2024-01-01T00:00:00.0000000-05:00",
        "MessageID": "b7bc2f4a-e38e-4336-af7d-e6c392c2f817",
        "ErrorCode": 0,
        "Message": "OK"
    }))
}

#[tokio::test]
async fn successful_delivery_returns_message_id() {
    let server = MockServer::start().await;
    let provider = PostmarkProvider::new("server-token").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/email"))
        .and(header("X-Postmark-Server-Token", "server-token"))
        .and(header("Accept", "application/json"))
        .and(body_json(json!({
            "From": "tony.stark@example.com",
            "To": "steve.rogers@example.com",
            "Subject": "Hello, Avengers!",
            "HtmlBody": "<h1>Hello</h1>",
            "TextBody": "Hello"
        })))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    let response = provider.send_email(&valid_email()).await;
    assert!(response.success);
    assert_eq!(response.provider, "postmark");
    assert_eq!(
        response.id.as_deref(),
        Some("b7bc2f4a-e38e-4336-af7d-e6c392c2f817")
    );
}

#[tokio::test]
async fn accepted_without_message_id_is_success() {
    let server = MockServer::start().await;
    let provider = PostmarkProvider::new("server-token").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ErrorCode": 0,
            "Message": "OK"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider.send_email(&valid_email()).await;
    assert!(response.success, "{:?}", response.error);
    assert!(response.id.is_none());
}

#[tokio::test]
async fn accepted_with_empty_body_is_success() {
    let server = MockServer::start().await;
    let provider = PostmarkProvider::new("server-token").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider.send_email(&valid_email()).await;
    assert!(response.success);
    assert!(response.id.is_none());
}

#[tokio::test]
async fn recipients_are_comma_joined() {
    let server = MockServer::start().await;
    let provider = PostmarkProvider::new("server-token").base_url(server.uri());

    let email = EmailOptions::new()
        .from(("T Stark", "tony.stark@example.com"))
        .to(("Steve Rogers", "steve.rogers@example.com"))
        .to("bruce.banner@example.com")
        .cc("wasp.avengers@example.com")
        .reply_to("hulk.smash@example.com")
        .subject("Hello, Avengers!")
        .text("Hello");

    Mock::given(method("POST"))
        .and(path("/email"))
        .and(body_json(json!({
            "From": "T Stark <tony.stark@example.com>",
            "To": "Steve Rogers <steve.rogers@example.com>, bruce.banner@example.com",
            "Subject": "Hello, Avengers!",
            "TextBody": "Hello",
            "Cc": "wasp.avengers@example.com",
            "ReplyTo": "hulk.smash@example.com"
        })))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    assert!(provider.send_email(&email).await.success);
}

#[tokio::test]
async fn vendor_error_includes_error_code() {
    let server = MockServer::start().await;
    let provider = PostmarkProvider::new("server-token").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/email"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "ErrorCode": 300,
            "Message": "Invalid email request"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider.send_email(&valid_email()).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("[300] Invalid email request"));
}

#[tokio::test]
async fn configured_from_env() {
    let env = Env::from_pairs([("POSTMARK_API_KEY", "server-token")]);
    let provider = PostmarkProvider::from_env(&env, &ProviderConfig::default());
    assert!(provider.is_configured());
    assert_eq!(provider.info().name, "postmark");
}

#[tokio::test]
async fn unconfigured_provider_never_calls_vendor() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(success_response())
        .expect(0)
        .mount(&server)
        .await;

    let provider =
        PostmarkProvider::from_env(&Env::default(), &ProviderConfig::new().base_url(server.uri()));
    let response = provider.send_email(&valid_email()).await;
    assert!(!response.success);
    assert_eq!(response.provider, "postmark");
}
