//! Postmark API provider.
//!
//! # Example
//!
//! ```rust,ignore
//! use mailroom::providers::PostmarkProvider;
//!
//! let provider = PostmarkProvider::new("xxxxx-xxxx-xxxx-xxxx-xxxxxx");
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::config::{Env, ProviderConfig};
use crate::error::MailError;
use crate::options::EmailOptions;
use crate::provider::{require_recipients, EmailProvider};

use super::http_client;

const POSTMARK_API_URL: &str = "https://api.postmarkapp.com";

/// Postmark API email provider.
pub struct PostmarkProvider {
    api_token: Option<String>,
    client: Option<Client>,
    base_url: String,
    default_from: Option<Address>,
}

impl PostmarkProvider {
    /// Create a new Postmark provider with the given server token.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: Some(api_token.into()).filter(|k: &String| !k.is_empty()),
            client: http_client("postmark"),
            base_url: POSTMARK_API_URL.to_string(),
            default_from: None,
        }
    }

    /// Build from the environment (`POSTMARK_API_KEY`), with optional overrides.
    pub fn from_env(env: &Env, config: &ProviderConfig) -> Self {
        Self {
            api_token: config
                .api_key
                .clone()
                .or_else(|| env.get("POSTMARK_API_KEY").map(str::to_string)),
            client: http_client("postmark"),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| POSTMARK_API_URL.to_string()),
            default_from: config.default_from.clone().or_else(|| env.default_from()),
        }
    }

    /// Create with a custom reqwest client.
    pub fn with_client(api_token: impl Into<String>, client: Client) -> Self {
        Self {
            client: Some(client),
            ..Self::new(api_token)
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

    fn build_request(&self, options: &EmailOptions) -> Result<PostmarkRequest, MailError> {
        let from = options
            .from
            .as_ref()
            .or(self.default_from.as_ref())
            .ok_or(MailError::MissingField("from"))?;
        require_recipients(options)?;

        Ok(PostmarkRequest {
            from: from.formatted(),
            to: joined(&options.to).unwrap_or_default(),
            subject: options.subject.clone(),
            html_body: options.html.clone(),
            text_body: options.text.clone(),
            cc: joined(&options.cc),
            bcc: joined(&options.bcc),
            reply_to: options.reply_to.as_ref().map(Address::formatted),
        })
    }

    fn parse_error(status: reqwest::StatusCode, error: PostmarkError) -> MailError {
        MailError::provider_with_status(
            "postmark",
            format!("[{}] {}", error.error_code, error.message),
            status.as_u16(),
        )
    }
}

/// Postmark takes comma-separated recipient lists.
fn joined(addrs: &[Address]) -> Option<String> {
    if addrs.is_empty() {
        None
    } else {
        Some(
            addrs
                .iter()
                .map(Address::formatted)
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

#[async_trait]
impl EmailProvider for PostmarkProvider {
    async fn deliver(&self, options: &EmailOptions) -> Result<Option<String>, MailError> {
        let (Some(client), Some(api_token)) = (&self.client, &self.api_token) else {
            return Err(MailError::NotConfigured("postmark"));
        };
        let request = self.build_request(options)?;

        let url = format!("{}/email", self.base_url);
        let response = client
            .post(&url)
            .header("X-Postmark-Server-Token", api_token)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("User-Agent", format!("mailroom/{}", crate::VERSION))
            .json(&request)
            .send()
            .await?;
        let status = response.status();

        if status.is_success() {
            // Accepted even when the body carries no id
            let result = response.json::<PostmarkResponse>().await.ok();
            Ok(result.map(|r| r.message_id))
        } else {
            let error: PostmarkError = response.json().await.unwrap_or(PostmarkError {
                error_code: 0,
                message: "Unknown error".to_string(),
            });
            Err(Self::parse_error(status, error))
        }
    }

    fn is_configured(&self) -> bool {
        self.api_token.is_some() && self.client.is_some()
    }

    fn provider_name(&self) -> &'static str {
        "postmark"
    }
}

// ============================================================================
// Postmark API Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PostmarkRequest {
    from: String,
    to: String,
    subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    html_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bcc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostmarkResponse {
    #[serde(rename = "MessageID")]
    message_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PostmarkError {
    error_code: i64,
    message: String,
}
