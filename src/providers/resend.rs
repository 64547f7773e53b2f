//! Resend API provider.
//!
//! # Example
//!
//! ```rust,ignore
//! use mailroom::providers::ResendProvider;
//!
//! let provider = ResendProvider::new("re_xxxxx");
//! ```
//!
//! Reads `RESEND_API_KEY` when built with [`ResendProvider::from_env`].

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::config::{Env, ProviderConfig};
use crate::error::MailError;
use crate::options::EmailOptions;
use crate::provider::{require_recipients, EmailProvider};

use super::http_client;

const RESEND_API_URL: &str = "https://api.resend.com";

/// Resend API email provider.
pub struct ResendProvider {
    api_key: Option<String>,
    client: Option<Client>,
    base_url: String,
    default_from: Option<Address>,
}

impl ResendProvider {
    /// Create a new Resend provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()).filter(|k: &String| !k.is_empty()),
            client: http_client("resend"),
            base_url: RESEND_API_URL.to_string(),
            default_from: None,
        }
    }

    /// Build from the environment, with optional overrides.
    pub fn from_env(env: &Env, config: &ProviderConfig) -> Self {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| env.get("RESEND_API_KEY").map(str::to_string));
        let mut provider = Self {
            api_key,
            client: http_client("resend"),
            base_url: RESEND_API_URL.to_string(),
            default_from: config.default_from.clone().or_else(|| env.default_from()),
        };
        if let Some(url) = &config.base_url {
            provider.base_url = url.clone();
        }
        provider
    }

    /// Create with a custom reqwest client.
    pub fn with_client(api_key: impl Into<String>, client: Client) -> Self {
        Self {
            client: Some(client),
            ..Self::new(api_key)
        }
    }

    /// Set a custom base URL (for testing).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the sender used when an email has no `from`.
    pub fn default_from(mut self, from: impl Into<Address>) -> Self {
        self.default_from = Some(from.into());
        self
    }

    fn build_request(&self, options: &EmailOptions) -> Result<ResendRequest, MailError> {
        let from = options
            .from
            .as_ref()
            .or(self.default_from.as_ref())
            .ok_or(MailError::MissingField("from"))?;
        require_recipients(options)?;

        Ok(ResendRequest {
            from: from.formatted(),
            to: options.to.iter().map(Address::formatted).collect(),
            subject: options.subject.clone(),
            html: options.html.clone(),
            text: options.text.clone(),
            cc: formatted_list(&options.cc),
            bcc: formatted_list(&options.bcc),
            reply_to: options.reply_to.as_ref().map(Address::formatted),
        })
    }
}

fn formatted_list(addrs: &[Address]) -> Option<Vec<String>> {
    if addrs.is_empty() {
        None
    } else {
        Some(addrs.iter().map(Address::formatted).collect())
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    async fn deliver(&self, options: &EmailOptions) -> Result<Option<String>, MailError> {
        let (Some(client), Some(api_key)) = (&self.client, &self.api_key) else {
            return Err(MailError::NotConfigured("resend"));
        };
        let request = self.build_request(options)?;

        let url = format!("{}/emails", self.base_url);
        let response = client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .header("User-Agent", format!("mailroom/{}", crate::VERSION))
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            // Accepted even when the body carries no id
            let result = response.json::<ResendResponse>().await.ok();
            Ok(result.map(|r| r.id))
        } else {
            let error: ResendError = response.json().await.unwrap_or(ResendError {
                message: "Unknown error".to_string(),
            });
            Err(MailError::provider_with_status(
                "resend",
                error.message,
                status.as_u16(),
            ))
        }
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.client.is_some()
    }

    fn provider_name(&self) -> &'static str {
        "resend"
    }
}

// ============================================================================
// Resend API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ResendRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cc: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bcc: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ResendError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_from_env() {
        let env = Env::from_pairs([("RESEND_API_KEY", "re_123")]);
        let provider = ResendProvider::from_env(&env, &ProviderConfig::default());
        assert!(provider.is_configured());
        assert_eq!(provider.provider_name(), "resend");
    }

    #[test]
    fn test_missing_key_is_not_configured() {
        let provider = ResendProvider::from_env(&Env::default(), &ProviderConfig::default());
        assert!(!provider.is_configured());

        let provider = ResendProvider::new("");
        assert!(!provider.is_configured());
    }

    #[test]
    fn test_config_overrides_env() {
        let env = Env::from_pairs([("RESEND_API_KEY", "re_env")]);
        let config = ProviderConfig::new()
            .api_key("re_override")
            .base_url("http://localhost:9999");
        let provider = ResendProvider::from_env(&env, &config);
        assert_eq!(provider.api_key.as_deref(), Some("re_override"));
        assert_eq!(provider.base_url, "http://localhost:9999");
    }

    #[test]
    fn test_build_request_uses_default_from() {
        let provider = ResendProvider::new("re_123").default_from("noreply@example.com");
        let request = provider
            .build_request(&EmailOptions::new().to("ada@example.com").subject("Hi"))
            .unwrap();
        assert_eq!(request.from, "noreply@example.com");
        assert_eq!(request.cc, None);
    }

    #[test]
    fn test_build_request_without_from_fails() {
        let provider = ResendProvider::new("re_123");
        let err = provider
            .build_request(&EmailOptions::new().to("ada@example.com"))
            .unwrap_err();
        assert!(matches!(err, MailError::MissingField("from")));
    }
}
