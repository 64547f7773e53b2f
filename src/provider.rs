//! The provider contract and the normalized send result.
//!
//! # Why `async_trait`?
//!
//! The [`MailService`](crate::MailService) holds its active adapter as an
//! `Arc<dyn EmailProvider>` so it can be chosen at runtime (auto-detection,
//! `EMAIL_PROVIDER`) and swapped with `switch_provider`. Native async traits
//! are not object-safe, so the trait is declared with `#[async_trait]`, which
//! boxes one future per send. Sends are network-bound; the allocation does not
//! show up next to vendor latency.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MailError;
use crate::options::EmailOptions;

/// Outcome of one send attempt.
///
/// On success `id` holds the vendor message id (when the vendor returns one);
/// on failure `error` holds a human-readable message. `provider` names the
/// adapter that handled the attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub provider: String,
}

impl EmailResponse {
    /// A successful send.
    pub fn success(provider: impl Into<String>, id: Option<String>) -> Self {
        Self {
            success: true,
            id,
            error: None,
            provider: provider.into(),
        }
    }

    /// A failed send.
    pub fn failure(provider: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            id: None,
            error: Some(error.into()),
            provider: provider.into(),
        }
    }

    /// A failed send built from a [`MailError`].
    pub fn from_error(provider: impl Into<String>, error: &MailError) -> Self {
        Self::failure(provider, error.to_string())
    }
}

/// Identity and configuration state of an adapter, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderInfo {
    pub name: &'static str,
    pub configured: bool,
}

/// A vendor adapter.
///
/// Implementors provide [`deliver`](EmailProvider::deliver), the fallible
/// vendor call, and [`is_configured`](EmailProvider::is_configured). Callers
/// use [`send_email`](EmailProvider::send_email), which never fails: every
/// error is folded into a failed [`EmailResponse`].
///
/// ```ignore
/// use mailroom::{EmailOptions, EmailProvider};
/// use mailroom::providers::ResendProvider;
///
/// let provider = ResendProvider::new("re_xxxxx");
/// let response = provider
///     .send_email(&EmailOptions::new().to("ada@example.com").subject("Hi").text("Hello"))
///     .await;
/// if !response.success {
///     eprintln!("send failed: {:?}", response.error);
/// }
/// ```
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Perform exactly one vendor call.
    ///
    /// Returns the vendor message id, if the vendor supplies one.
    async fn deliver(&self, options: &EmailOptions) -> Result<Option<String>, MailError>;

    /// Whether credentials are present and the client was constructed.
    ///
    /// Must not perform I/O.
    fn is_configured(&self) -> bool;

    /// Stable provider name (for logging and diagnostics).
    fn provider_name(&self) -> &'static str;

    /// Send an email, normalizing every outcome into an [`EmailResponse`].
    ///
    /// An unconfigured adapter fails without touching the network.
    async fn send_email(&self, options: &EmailOptions) -> EmailResponse {
        let provider = self.provider_name();
        if !self.is_configured() {
            return EmailResponse::from_error(provider, &MailError::NotConfigured(provider));
        }
        match self.deliver(options).await {
            Ok(id) => EmailResponse::success(provider, id),
            Err(e) => {
                tracing::debug!(provider, error = %e, "Vendor call failed");
                EmailResponse::from_error(provider, &e)
            }
        }
    }

    /// Identity and configuration state.
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: self.provider_name(),
            configured: self.is_configured(),
        }
    }
}

/// Reject options that no vendor can deliver.
pub(crate) fn require_recipients(options: &EmailOptions) -> Result<(), MailError> {
    if options.to.is_empty() {
        return Err(MailError::MissingField("to"));
    }
    Ok(())
}
