//! SendGrid API provider.
//!
//! # Example
//!
//! ```rust,ignore
//! use mailroom::providers::SendGridProvider;
//!
//! let provider = SendGridProvider::new("SG.xxxxx").compress(true);
//! ```
//!
//! SendGrid answers `202 Accepted` with an empty body; the message id comes
//! from the `X-Message-Id` response header and may be missing.

use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::address::Address;
use crate::config::{Env, ProviderConfig};
use crate::error::MailError;
use crate::options::EmailOptions;
use crate::provider::{require_recipients, EmailProvider};

use super::http_client;

const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3";

/// SendGrid API email provider.
pub struct SendGridProvider {
    api_key: Option<String>,
    client: Option<Client>,
    base_url: String,
    compress: bool,
    default_from: Option<Address>,
}

impl SendGridProvider {
    /// Create a new SendGrid provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()).filter(|k: &String| !k.is_empty()),
            client: http_client("sendgrid"),
            base_url: SENDGRID_API_URL.to_string(),
            compress: false,
            default_from: None,
        }
    }

    /// Build from the environment (`SENDGRID_API_KEY`), with optional overrides.
    pub fn from_env(env: &Env, config: &ProviderConfig) -> Self {
        Self {
            api_key: config
                .api_key
                .clone()
                .or_else(|| env.get("SENDGRID_API_KEY").map(str::to_string)),
            client: http_client("sendgrid"),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| SENDGRID_API_URL.to_string()),
            compress: false,
            default_from: config.default_from.clone().or_else(|| env.default_from()),
        }
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

    /// Enable gzip compression for requests.
    pub fn compress(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    /// Set the sender used when an email has no `from`.
    pub fn default_from(mut self, from: impl Into<Address>) -> Self {
        self.default_from = Some(from.into());
        self
    }

    fn build_request(&self, options: &EmailOptions) -> Result<SendGridRequest, MailError> {
        let from = options
            .from
            .as_ref()
            .or(self.default_from.as_ref())
            .ok_or(MailError::MissingField("from"))?;
        require_recipients(options)?;

        // SendGrid requires text/plain before text/html
        let mut content = Vec::new();
        if let Some(ref text) = options.text {
            content.push(SendGridContent {
                content_type: "text/plain".to_string(),
                value: text.clone(),
            });
        }
        if let Some(ref html) = options.html {
            content.push(SendGridContent {
                content_type: "text/html".to_string(),
                value: html.clone(),
            });
        }

        Ok(SendGridRequest {
            personalizations: vec![SendGridPersonalization {
                to: options.to.iter().map(SendGridAddress::from).collect(),
                cc: address_list(&options.cc),
                bcc: address_list(&options.bcc),
            }],
            from: SendGridAddress::from(from),
            reply_to: options.reply_to.as_ref().map(SendGridAddress::from),
            subject: options.subject.clone(),
            content: if content.is_empty() {
                None
            } else {
                Some(content)
            },
        })
    }

    fn compress_body(&self, body: &[u8]) -> Result<Vec<u8>, MailError> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(body).map_err(|e| {
            MailError::provider("sendgrid", format!("Failed to compress body: {}", e))
        })?;
        encoder.finish().map_err(|e| {
            MailError::provider("sendgrid", format!("Failed to finish compression: {}", e))
        })
    }
}

fn address_list(addrs: &[Address]) -> Option<Vec<SendGridAddress>> {
    if addrs.is_empty() {
        None
    } else {
        Some(addrs.iter().map(SendGridAddress::from).collect())
    }
}

#[async_trait]
impl EmailProvider for SendGridProvider {
    async fn deliver(&self, options: &EmailOptions) -> Result<Option<String>, MailError> {
        let (Some(client), Some(api_key)) = (&self.client, &self.api_key) else {
            return Err(MailError::NotConfigured("sendgrid"));
        };
        let request = self.build_request(options)?;

        let url = format!("{}/mail/send", self.base_url);
        let json_body = serde_json::to_vec(&request)?;

        let mut req = client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .header("User-Agent", format!("mailroom/{}", crate::VERSION));

        let body = if self.compress {
            req = req.header("Content-Encoding", "gzip");
            self.compress_body(&json_body)?
        } else {
            json_body
        };

        let response = req.body(body).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response
                .headers()
                .get("X-Message-Id")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string()))
        } else {
            let error: SendGridError = response.json().await.unwrap_or(SendGridError {
                errors: vec![SendGridErrorDetail {
                    message: "Unknown error".to_string(),
                }],
            });

            let error_msg = error
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");

            Err(MailError::provider_with_status(
                "sendgrid",
                error_msg,
                status.as_u16(),
            ))
        }
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.client.is_some()
    }

    fn provider_name(&self) -> &'static str {
        "sendgrid"
    }
}

// ============================================================================
// SendGrid API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct SendGridRequest {
    personalizations: Vec<SendGridPersonalization>,
    from: SendGridAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<SendGridAddress>,
    subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<Vec<SendGridContent>>,
}

#[derive(Debug, Serialize)]
struct SendGridPersonalization {
    to: Vec<SendGridAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cc: Option<Vec<SendGridAddress>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bcc: Option<Vec<SendGridAddress>>,
}

#[derive(Debug, Serialize)]
struct SendGridAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl From<&Address> for SendGridAddress {
    fn from(addr: &Address) -> Self {
        Self {
            email: addr.email.clone(),
            name: addr.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendGridContent {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct SendGridError {
    errors: Vec<SendGridErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct SendGridErrorDetail {
    message: String,
}
