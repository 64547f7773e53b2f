//! Error types for mailroom.

use thiserror::Error;

/// Errors that can occur while building, rendering, or sending emails.
///
/// Most of these never reach application code: the provider contract and the
/// [`MailService`](crate::MailService) turn them into a failed
/// [`EmailResponse`](crate::EmailResponse). Only factory errors such as
/// [`MailError::UnsupportedProvider`] propagate.
#[derive(Debug, Clone, Error)]
pub enum MailError {
    /// The provider has no credentials or its client failed to initialize.
    #[error("Email provider '{0}' is not configured")]
    NotConfigured(&'static str),

    /// Unknown provider name requested from the factory.
    #[error("Unsupported email provider: {0}")]
    UnsupportedProvider(String),

    /// Configuration error (missing env var, disabled feature, invalid value).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing required field (e.g., recipients).
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Invalid email address format.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Error sending the email over a transport.
    #[error("Send error: {0}")]
    Send(String),

    /// The vendor call did not finish within the configured timeout.
    #[error("Send timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The vendor rejected the request.
    #[error("Provider error ({provider}): {message}")]
    ProviderError {
        provider: &'static str,
        message: String,
        /// Optional HTTP status code
        status: Option<u16>,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// No template resource exists for the given name.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// Template could not be read or rendered.
    #[error("Template error: {0}")]
    Template(String),
}

impl MailError {
    /// Create a provider-specific error.
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider,
            message: message.into(),
            status: None,
        }
    }

    /// Create a provider error with HTTP status.
    pub fn provider_with_status(
        provider: &'static str,
        message: impl Into<String>,
        status: u16,
    ) -> Self {
        Self::ProviderError {
            provider,
            message: message.into(),
            status: Some(status),
        }
    }
}

#[cfg(feature = "_http")]
impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<serde_json::Error> for MailError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

#[cfg(feature = "smtp")]
impl From<lettre::error::Error> for MailError {
    fn from(err: lettre::error::Error) -> Self {
        Self::Send(err.to_string())
    }
}

#[cfg(feature = "smtp")]
impl From<lettre::transport::smtp::Error> for MailError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        Self::Send(err.to_string())
    }
}

#[cfg(feature = "smtp")]
impl From<lettre::address::AddressError> for MailError {
    fn from(err: lettre::address::AddressError) -> Self {
        Self::InvalidAddress(err.to_string())
    }
}
