//! # Mailroom
//!
//! Transactional email for applications: pick a vendor from the environment,
//! render file-based templates, and send without letting delivery failures
//! break the calling workflow.
//!
//! ## Quick Start
//!
//! Set environment variables:
//! ```bash
//! RESEND_API_KEY=re_xxxxx
//! EMAIL_FROM=noreply@example.com
//! EMAIL_FROM_NAME=My App
//! ```
//!
//! Build the service once and share it:
//! ```rust,ignore
//! use mailroom::{EmailOptions, MailService};
//!
//! let mail = MailService::from_env()?;
//!
//! let response = mail
//!     .send_email(
//!         EmailOptions::new()
//!             .to("user@example.com")
//!             .subject("Welcome!")
//!             .text("Hello"),
//!     )
//!     .await;
//!
//! if !response.success {
//!     tracing::warn!(error = ?response.error, "welcome email not sent");
//! }
//! ```
//!
//! Sends never return `Err`: every outcome is an [`EmailResponse`].
//!
//! ## Provider Selection
//!
//! With `EMAIL_PROVIDER` unset, the first configured vendor wins, in this
//! order: Resend, SendGrid, Postmark, SMTP. If none is configured the service
//! still starts; [`MailService::is_configured`] reports `false` and sends fail
//! with a "not configured" response.
//!
//! ## Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `EMAIL_PROVIDER` | Force `resend`, `sendgrid`, `postmark`, `smtp` or `memory` |
//! | `EMAIL_FROM` | Default sender email |
//! | `EMAIL_FROM_NAME` | Default sender name |
//! | `EMAIL_SEND_TIMEOUT_SECS` | Per-send timeout in seconds (unset or `0`: none) |
//! | `EMAIL_TEMPLATES_DIR` | Template directory (default: `templates`) |
//! | `RESEND_API_KEY` | Resend API key |
//! | `SENDGRID_API_KEY` | SendGrid API key |
//! | `POSTMARK_API_KEY` | Postmark server token |
//! | `SMTP_HOST` | SMTP server host |
//! | `SMTP_PORT` | SMTP server port (default: 587) |
//! | `SMTP_USERNAME` | SMTP username |
//! | `SMTP_PASSWORD` | SMTP password |
//! | `SMTP_TLS` | `starttls` (default), `tls` or `none` |
//! | `APP_BASE_URL` | `{{base_url}}` in templates |
//! | `SUPPORT_EMAIL` | `{{support_email}}` in templates |
//! | `APP_NAME` | `{{app_name}}` in templates and subjects |
//!
//! A `.env` file in the working directory is loaded by
//! [`Env::from_process`].
//!
//! ## Feature Flags
//!
//! - `resend` - Resend API provider
//! - `sendgrid` - SendGrid API provider
//! - `postmark` - Postmark API provider
//! - `smtp` - SMTP provider via lettre
//! - `metrics` - Prometheus-style metrics (counters/histograms)
//! - `full` - everything above
//!
//! `resend`, `sendgrid`, `postmark` and `smtp` are on by default.
//!
//! ## Metrics
//!
//! Enable `features = ["metrics"]` to emit:
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `mailroom_emails_total` | Counter | provider, status | Total emails sent |
//! | `mailroom_delivery_duration_seconds` | Histogram | provider | Delivery duration |
//! | `mailroom_batch_size` | Histogram | provider | Emails per bulk send |
//!
//! Install a recorder (e.g., `metrics-exporter-prometheus`) in your app to collect them.

/// The version of the mailroom crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod address;
mod config;
mod error;
mod factory;
mod options;
mod provider;
mod service;

pub mod providers;
pub mod template;

pub use address::{Address, ToAddress};
pub use config::{Env, ProviderConfig};
pub use error::MailError;
pub use factory::{ProviderFactory, ProviderKind};
pub use options::EmailOptions;
pub use provider::{EmailProvider, EmailResponse, ProviderInfo};
pub use service::{MailService, MailServiceBuilder};
pub use template::{
    html_to_text, EmailTemplates, EvaluationReport, RenderedTemplate, ScoreTier,
    TemplateEngine, TemplateVariables,
};

/// Common imports.
pub mod prelude {
    pub use crate::{
        Address, EmailOptions, EmailProvider, EmailResponse, EvaluationReport, MailError,
        MailService, ProviderConfig, TemplateVariables, ToAddress,
    };
}
