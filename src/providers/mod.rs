//! Email provider implementations.
//!
//! Each provider implements the [`EmailProvider`](crate::EmailProvider) trait.
//!
//! ## Available Providers
//!
//! | Provider | Feature Flag | Credentials |
//! |----------|-------------|-------------|
//! | [`ResendProvider`] | `resend` | `RESEND_API_KEY` |
//! | [`SendGridProvider`] | `sendgrid` | `SENDGRID_API_KEY` |
//! | [`PostmarkProvider`] | `postmark` | `POSTMARK_API_KEY` |
//! | [`SmtpProvider`] | `smtp` | `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD` |
//! | [`MemoryProvider`] | (none) | captures emails in memory |
//! | [`DisabledProvider`] | (none) | never configured |

#[cfg(feature = "resend")]
mod resend;
#[cfg(feature = "resend")]
pub use resend::ResendProvider;

#[cfg(feature = "sendgrid")]
mod sendgrid;
#[cfg(feature = "sendgrid")]
pub use sendgrid::SendGridProvider;

#[cfg(feature = "postmark")]
mod postmark;
#[cfg(feature = "postmark")]
pub use postmark::PostmarkProvider;

#[cfg(feature = "smtp")]
mod smtp;
#[cfg(feature = "smtp")]
pub use smtp::{SmtpProvider, SmtpSettings, TlsMode};

mod disabled;
pub use disabled::DisabledProvider;

mod memory;
pub use memory::MemoryProvider;

/// Build the shared HTTP client, or `None` if it cannot be constructed.
#[cfg(feature = "_http")]
fn http_client(provider: &'static str) -> Option<reqwest::Client> {
    match reqwest::Client::builder()
        .user_agent(format!("mailroom/{}", crate::VERSION))
        .build()
    {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::warn!(provider, error = %e, "Failed to build HTTP client");
            None
        }
    }
}
