//! SMTP provider using lettre.
//!
//! # Example
//!
//! ```rust,ignore
//! use mailroom::providers::{SmtpProvider, SmtpSettings, TlsMode};
//!
//! let provider = SmtpProvider::new(
//!     SmtpSettings::new("smtp.example.com", 587).credentials("user", "pass"),
//! );
//!
//! // Local relay without TLS
//! let provider = SmtpProvider::new(SmtpSettings::new("localhost", 25).tls(TlsMode::None));
//! ```

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart},
    transport::smtp::{authentication::Credentials, response::Response},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::address::Address;
use crate::config::{Env, ProviderConfig};
use crate::error::MailError;
use crate::options::EmailOptions;
use crate::provider::{require_recipients, EmailProvider};

const DEFAULT_PORT: u16 = 587;

/// TLS mode for the SMTP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// No TLS (only for localhost relays)
    None,
    /// STARTTLS - upgrade to TLS after connecting (port 587)
    #[default]
    StartTls,
    /// Implicit TLS - connect with TLS from start (port 465)
    Tls,
}

impl TlsMode {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "none" | "off" | "false" => Some(Self::None),
            "starttls" => Some(Self::StartTls),
            "tls" | "ssl" => Some(Self::Tls),
            _ => None,
        }
    }
}

/// Connection settings for [`SmtpProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub tls: TlsMode,
}

impl SmtpSettings {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
            tls: TlsMode::default(),
        }
    }

    /// Set SMTP credentials.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set TLS mode.
    pub fn tls(mut self, mode: TlsMode) -> Self {
        self.tls = mode;
        self
    }

    /// Read `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_TLS`.
    ///
    /// Returns `None` when no host is set.
    pub fn from_env(env: &Env) -> Option<Self> {
        let host = env.get("SMTP_HOST")?;
        let port = env
            .get("SMTP_PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let tls = match env.get("SMTP_TLS") {
            Some(raw) => TlsMode::parse(raw).unwrap_or_else(|| {
                tracing::warn!(value = raw, "Unknown SMTP_TLS mode, using starttls");
                TlsMode::StartTls
            }),
            None => TlsMode::StartTls,
        };
        Some(Self {
            host: host.to_string(),
            port,
            username: env.get("SMTP_USERNAME").map(str::to_string),
            password: env.get("SMTP_PASSWORD").map(str::to_string),
            tls,
        })
    }
}

/// SMTP email provider.
pub struct SmtpProvider {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    default_from: Option<Address>,
}

impl SmtpProvider {
    /// Create a provider for the given server.
    ///
    /// A transport that cannot be built leaves the provider unconfigured.
    pub fn new(settings: SmtpSettings) -> Self {
        Self {
            transport: build_transport(&settings),
            default_from: None,
        }
    }

    /// Build from `SMTP_*` variables. Without `SMTP_HOST` the provider is
    /// unconfigured.
    pub fn from_env(env: &Env, config: &ProviderConfig) -> Self {
        Self {
            transport: SmtpSettings::from_env(env).and_then(|s| build_transport(&s)),
            default_from: config.default_from.clone().or_else(|| env.default_from()),
        }
    }

    /// Set the sender used when an email has no `from`.
    pub fn default_from(mut self, from: impl Into<Address>) -> Self {
        self.default_from = Some(from.into());
        self
    }

    /// Build a lettre Message from the options.
    fn build_message(&self, options: &EmailOptions) -> Result<Message, MailError> {
        let from = options
            .from
            .as_ref()
            .or(self.default_from.as_ref())
            .ok_or(MailError::MissingField("from"))?;
        require_recipients(options)?;

        let mut builder = Message::builder()
            .from(address_to_mailbox(from)?)
            .subject(&options.subject);

        for to in &options.to {
            builder = builder.to(address_to_mailbox(to)?);
        }
        for cc in &options.cc {
            builder = builder.cc(address_to_mailbox(cc)?);
        }
        for bcc in &options.bcc {
            builder = builder.bcc(address_to_mailbox(bcc)?);
        }
        if let Some(reply_to) = &options.reply_to {
            builder = builder.reply_to(address_to_mailbox(reply_to)?);
        }

        let message = match (&options.html, &options.text) {
            (Some(html), Some(text)) => {
                builder.multipart(MultiPart::alternative_plain_html(text.clone(), html.clone()))?
            }
            (Some(html), None) => builder.header(ContentType::TEXT_HTML).body(html.clone())?,
            (None, Some(text)) => builder.header(ContentType::TEXT_PLAIN).body(text.clone())?,
            (None, None) => builder
                .header(ContentType::TEXT_PLAIN)
                .body(String::new())?,
        };

        Ok(message)
    }
}

fn build_transport(settings: &SmtpSettings) -> Option<AsyncSmtpTransport<Tokio1Executor>> {
    let builder = match settings.tls {
        TlsMode::None => Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(
            &settings.host,
        )),
        TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host),
        TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host),
    };

    let mut builder = match builder {
        Ok(b) => b.port(settings.port),
        Err(e) => {
            tracing::warn!(host = %settings.host, error = %e, "Failed to build SMTP transport");
            return None;
        }
    };

    if let Some(username) = &settings.username {
        builder = builder.credentials(Credentials::new(
            username.clone(),
            settings.password.clone().unwrap_or_default(),
        ));
    }

    Some(builder.build())
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn deliver(&self, options: &EmailOptions) -> Result<Option<String>, MailError> {
        let Some(transport) = &self.transport else {
            return Err(MailError::NotConfigured("smtp"));
        };
        let message = self.build_message(options)?;

        let response = transport
            .send(message)
            .await
            .map_err(|e| MailError::Send(e.to_string()))?;

        Ok(queue_id(&response))
    }

    fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    fn provider_name(&self) -> &'static str {
        "smtp"
    }
}

/// Servers usually echo a queue id in the first response line.
fn queue_id(response: &Response) -> Option<String> {
    response
        .message()
        .next()
        .and_then(|m| m.lines().next())
        .map(str::to_string)
}

/// Convert an Address to lettre's Mailbox.
fn address_to_mailbox(addr: &Address) -> Result<Mailbox, MailError> {
    let email = addr
        .email
        .parse()
        .map_err(|e: lettre::address::AddressError| MailError::InvalidAddress(e.to_string()))?;

    Ok(Mailbox::new(addr.name.clone(), email))
}
