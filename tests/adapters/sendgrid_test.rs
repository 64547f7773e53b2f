//! SendGrid adapter tests.

use mailroom::providers::SendGridProvider;
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

#[tokio::test]
async fn successful_delivery_uses_message_id_header() {
    let server = MockServer::start().await;
    let provider = SendGridProvider::new("SG.123456789").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .and(header("Authorization", "Bearer SG.123456789"))
        .and(body_json(json!({
            "personalizations": [{
                "to": [{"email": "steve.rogers@example.com"}]
            }],
            "from": {"email": "tony.stark@example.com"},
            "subject": "Hello, Avengers!",
            "content": [
                {"type": "text/plain", "value": "Hello"},
                {"type": "text/html", "value": "<h1>Hello</h1>"}
            ]
        })))
        .respond_with(ResponseTemplate::new(202).insert_header("X-Message-Id", "sg-msg-123"))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider.send_email(&valid_email()).await;
    assert!(response.success);
    assert_eq!(response.provider, "sendgrid");
    assert_eq!(response.id.as_deref(), Some("sg-msg-123"));
}

#[tokio::test]
async fn missing_message_id_header_is_still_success() {
    let server = MockServer::start().await;
    let provider = SendGridProvider::new("SG.123456789").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider.send_email(&valid_email()).await;
    assert!(response.success);
    assert!(response.id.is_none());
}

#[tokio::test]
async fn named_recipients_and_copies() {
    let server = MockServer::start().await;
    let provider = SendGridProvider::new("SG.123456789").base_url(server.uri());

    let email = EmailOptions::new()
        .from(("T Stark", "tony.stark@example.com"))
        .to(("Steve Rogers", "steve.rogers@example.com"))
        .cc("bruce.banner@example.com")
        .bcc("thor.odinson@example.com")
        .reply_to("hulk.smash@example.com")
        .subject("Hello, Avengers!")
        .text("Hello");

    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .and(body_json(json!({
            "personalizations": [{
                "to": [{"email": "steve.rogers@example.com", "name": "Steve Rogers"}],
                "cc": [{"email": "bruce.banner@example.com"}],
                "bcc": [{"email": "thor.odinson@example.com"}]
            }],
            "from": {"email": "tony.stark@example.com", "name": "T Stark"},
            "reply_to": {"email": "hulk.smash@example.com"},
            "subject": "Hello, Avengers!",
            "content": [{"type": "text/plain", "value": "Hello"}]
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    assert!(provider.send_email(&email).await.success);
}

#[tokio::test]
async fn compressed_request_sets_content_encoding() {
    let server = MockServer::start().await;
    let provider = SendGridProvider::new("SG.123456789")
        .base_url(server.uri())
        .compress(true);

    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .and(header("Content-Encoding", "gzip"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    assert!(provider.send_email(&valid_email()).await.success);
}

#[tokio::test]
async fn vendor_errors_are_joined() {
    let server = MockServer::start().await;
    let provider = SendGridProvider::new("SG.123456789").base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [
                {"message": "The from address does not match a verified Sender Identity.", "field": "from"},
                {"message": "Invalid subject.", "field": "subject"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider.send_email(&valid_email()).await;
    assert!(!response.success);
    let error = response.error.unwrap();
    assert!(error.contains(
        "The from address does not match a verified Sender Identity.; Invalid subject."
    ));
}

#[tokio::test]
async fn unconfigured_provider_never_calls_vendor() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&server)
        .await;

    let env = Env::from_pairs([("SENDGRID_API_KEY", "")]);
    let provider =
        SendGridProvider::from_env(&env, &ProviderConfig::new().base_url(server.uri()));
    assert!(!provider.is_configured());
    assert!(!provider.send_email(&valid_email()).await.success);
}
