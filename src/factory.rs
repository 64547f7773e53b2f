//! Provider construction and auto-detection.
//!
//! Vendors are tried in a fixed preference order:
//!
//! | Order | Provider | Feature | Configured when |
//! |-------|----------|---------|-----------------|
//! | 1 | Resend | `resend` | `RESEND_API_KEY` is set |
//! | 2 | SendGrid | `sendgrid` | `SENDGRID_API_KEY` is set |
//! | 3 | Postmark | `postmark` | `POSTMARK_API_KEY` is set |
//! | 4 | SMTP | `smtp` | `SMTP_HOST` is set |
//!
//! Vendors whose feature is disabled are skipped.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::{Env, ProviderConfig};
use crate::error::MailError;
use crate::provider::EmailProvider;
use crate::providers;

/// Known provider names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Resend,
    SendGrid,
    Postmark,
    Smtp,
    /// In-memory capture; never auto-detected.
    Memory,
}

impl ProviderKind {
    /// Auto-detection order.
    pub const PREFERENCE: [ProviderKind; 4] = [
        ProviderKind::Resend,
        ProviderKind::SendGrid,
        ProviderKind::Postmark,
        ProviderKind::Smtp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resend => "resend",
            Self::SendGrid => "sendgrid",
            Self::Postmark => "postmark",
            Self::Smtp => "smtp",
            Self::Memory => "memory",
        }
    }

    /// Whether the adapter for this kind is compiled in.
    pub fn is_enabled(self) -> bool {
        match self {
            Self::Resend => cfg!(feature = "resend"),
            Self::SendGrid => cfg!(feature = "sendgrid"),
            Self::Postmark => cfg!(feature = "postmark"),
            Self::Smtp => cfg!(feature = "smtp"),
            Self::Memory => true,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resend" => Ok(Self::Resend),
            "sendgrid" => Ok(Self::SendGrid),
            "postmark" => Ok(Self::Postmark),
            "smtp" => Ok(Self::Smtp),
            "memory" => Ok(Self::Memory),
            _ => Err(MailError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// Builds providers from an [`Env`] snapshot.
#[derive(Debug, Clone, Default)]
pub struct ProviderFactory {
    env: Env,
}

impl ProviderFactory {
    pub fn new(env: Env) -> Self {
        Self { env }
    }

    /// Factory over the process environment.
    pub fn from_process_env() -> Self {
        Self::new(Env::from_process())
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Create a provider by name.
    ///
    /// Unknown names fail with [`MailError::UnsupportedProvider`]; known
    /// vendors compiled out fail with [`MailError::Configuration`]. Missing
    /// credentials are not an error: the adapter is returned unconfigured.
    pub fn create_provider(
        &self,
        name: &str,
        config: &ProviderConfig,
    ) -> Result<Arc<dyn EmailProvider>, MailError> {
        self.create(name.parse()?, config)
    }

    /// Create a provider of the given kind.
    pub fn create(
        &self,
        kind: ProviderKind,
        config: &ProviderConfig,
    ) -> Result<Arc<dyn EmailProvider>, MailError> {
        match kind {
            #[cfg(feature = "resend")]
            ProviderKind::Resend => Ok(Arc::new(providers::ResendProvider::from_env(
                &self.env, config,
            ))),
            #[cfg(feature = "sendgrid")]
            ProviderKind::SendGrid => Ok(Arc::new(providers::SendGridProvider::from_env(
                &self.env, config,
            ))),
            #[cfg(feature = "postmark")]
            ProviderKind::Postmark => Ok(Arc::new(providers::PostmarkProvider::from_env(
                &self.env, config,
            ))),
            #[cfg(feature = "smtp")]
            ProviderKind::Smtp => Ok(Arc::new(providers::SmtpProvider::from_env(
                &self.env, config,
            ))),
            ProviderKind::Memory => Ok(Arc::new(providers::MemoryProvider::new())),
            #[allow(unreachable_patterns)]
            other => Err(MailError::Configuration(format!(
                "provider '{other}' requested but the '{other}' feature is not enabled. \
                Add `features = [\"{other}\"]` to Cargo.toml"
            ))),
        }
    }

    /// First configured provider in [`ProviderKind::PREFERENCE`] order.
    ///
    /// If none is configured, returns the first-preference provider anyway;
    /// its sends fail with a "not configured" error. Check
    /// [`EmailProvider::is_configured`] before relying on delivery.
    pub fn auto_detect_provider(&self) -> Arc<dyn EmailProvider> {
        let mut fallback: Option<Arc<dyn EmailProvider>> = None;

        for provider in self.candidates() {
            if provider.is_configured() {
                tracing::debug!(provider = provider.provider_name(), "Auto-detected email provider");
                return provider;
            }
            fallback.get_or_insert(provider);
        }

        match fallback {
            Some(provider) => {
                tracing::warn!(
                    provider = provider.provider_name(),
                    "No email provider is configured; emails will not be delivered"
                );
                provider
            }
            None => {
                tracing::warn!("No email provider features are enabled");
                Arc::new(providers::DisabledProvider)
            }
        }
    }

    /// Like [`auto_detect_provider`](Self::auto_detect_provider), but returns
    /// `None` when nothing is configured.
    pub fn try_auto_detect_provider(&self) -> Option<Arc<dyn EmailProvider>> {
        self.candidates().find(|p| p.is_configured())
    }

    /// Honour `EMAIL_PROVIDER` if set, otherwise auto-detect.
    pub fn provider_from_env(&self) -> Result<Arc<dyn EmailProvider>, MailError> {
        match self.env.get("EMAIL_PROVIDER") {
            Some(name) => self.create_provider(name, &ProviderConfig::default()),
            None => Ok(self.auto_detect_provider()),
        }
    }

    fn candidates(&self) -> impl Iterator<Item = Arc<dyn EmailProvider>> + '_ {
        ProviderKind::PREFERENCE
            .into_iter()
            .filter(|kind| kind.is_enabled())
            .filter_map(|kind| self.create(kind, &ProviderConfig::default()).ok())
    }
}
