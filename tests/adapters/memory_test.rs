//! MemoryProvider tests.

use mailroom::providers::MemoryProvider;
use mailroom::{EmailOptions, EmailProvider};

fn email(to: &str) -> EmailOptions {
    EmailOptions::new()
        .from("sender@example.com")
        .to(to)
        .subject("Test")
        .text("Body")
}

#[tokio::test]
async fn captures_accepted_emails() {
    let provider = MemoryProvider::new();

    let response = provider.send_email(&email("a@example.com")).await;
    assert!(response.success);
    assert!(response.id.is_some());

    provider.send_email(&email("b@example.com")).await;
    assert_eq!(provider.email_count(), 2);
    assert!(provider.sent_to("a@example.com"));
    assert_eq!(provider.last_email().unwrap().to[0].email, "b@example.com");
}

#[tokio::test]
async fn failure_injection() {
    let provider = MemoryProvider::new();
    provider.fail_for("bad@example.com", "mailbox full");

    assert!(provider.send_email(&email("good@example.com")).await.success);
    let response = provider.send_email(&email("bad@example.com")).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("mailbox full"));
    assert_eq!(provider.email_count(), 1);

    provider.set_failure("service down");
    assert!(!provider.send_email(&email("good@example.com")).await.success);

    provider.clear_failure();
    assert!(provider.send_email(&email("good@example.com")).await.success);
}

#[tokio::test]
async fn unconfigured_memory_provider_fails() {
    let provider = MemoryProvider::unconfigured();
    let response = provider.send_email(&email("a@example.com")).await;
    assert!(!response.success);
    assert_eq!(provider.email_count(), 0);
}
