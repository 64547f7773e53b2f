//! The mail service: the single entry point application code talks to.
//!
//! ```rust,ignore
//! use mailroom::MailService;
//!
//! // At startup
//! let mail = MailService::from_env()?;
//! if !mail.is_configured() {
//!     tracing::warn!("email delivery disabled");
//! }
//!
//! // In a request handler
//! let response = mail.send_welcome_email("ada@example.com", "Ada").await;
//! if !response.success {
//!     // signup still succeeds; the email is best-effort
//! }
//! ```

use futures::future::join_all;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

#[cfg(feature = "metrics")]
use std::time::Instant;

use crate::address::{Address, ToAddress};
use crate::config::{Env, ProviderConfig};
use crate::error::MailError;
use crate::factory::ProviderFactory;
use crate::options::EmailOptions;
use crate::provider::{EmailProvider, EmailResponse, ProviderInfo};
use crate::template::{
    html_to_text, EmailTemplates, EvaluationReport, RenderedTemplate, TemplateVariables,
};

/// Facade over the active provider and the template renderers.
///
/// Every send returns an [`EmailResponse`]; expected failures (unconfigured
/// provider, missing template, vendor rejection, timeout) never surface as
/// errors. The active provider can be replaced at runtime with
/// [`switch_provider`](MailService::switch_provider); sends already in flight
/// finish on the provider they started with.
pub struct MailService {
    provider: RwLock<Arc<dyn EmailProvider>>,
    factory: ProviderFactory,
    templates: EmailTemplates,
    default_from: Option<Address>,
    send_timeout: Option<Duration>,
}

impl MailService {
    /// Start building a service around `provider`.
    pub fn builder(provider: Arc<dyn EmailProvider>) -> MailServiceBuilder {
        MailServiceBuilder {
            provider,
            env: Env::default(),
            templates: None,
            default_from: None,
            send_timeout: None,
        }
    }

    /// Build from the process environment.
    ///
    /// Fails only if `EMAIL_PROVIDER` names an unknown or compiled-out
    /// provider.
    pub fn from_env() -> Result<Self, MailError> {
        Self::from_env_snapshot(Env::from_process())
    }

    /// Build from an explicit environment snapshot.
    pub fn from_env_snapshot(env: Env) -> Result<Self, MailError> {
        let factory = ProviderFactory::new(env.clone());
        let provider = factory.provider_from_env()?;
        tracing::info!(
            provider = provider.provider_name(),
            configured = provider.is_configured(),
            "Mail service initialized"
        );
        Ok(Self {
            provider: RwLock::new(provider),
            templates: EmailTemplates::from_env(&env),
            default_from: env.default_from(),
            send_timeout: env.send_timeout(),
            factory,
        })
    }

    /// The active provider. Cheap: clones an `Arc`.
    pub fn provider(&self) -> Arc<dyn EmailProvider> {
        Arc::clone(&self.provider.read())
    }

    /// Template renderers used by the templated sends.
    pub fn templates(&self) -> &EmailTemplates {
        &self.templates
    }

    /// Whether the active provider can deliver.
    pub fn is_configured(&self) -> bool {
        self.provider().is_configured()
    }

    /// Name and configuration state of the active provider.
    pub fn provider_info(&self) -> ProviderInfo {
        self.provider().info()
    }

    /// Replace the active provider with a newly created one.
    ///
    /// Unknown provider names are returned as errors and leave the current
    /// provider in place.
    pub fn switch_provider(&self, name: &str, config: &ProviderConfig) -> Result<(), MailError> {
        let provider = self.factory.create_provider(name, config)?;
        self.set_provider(provider);
        Ok(())
    }

    /// Replace the active provider.
    pub fn set_provider(&self, provider: Arc<dyn EmailProvider>) {
        let next = provider.provider_name();
        let previous = {
            let mut guard = self.provider.write();
            std::mem::replace(&mut *guard, provider)
        };
        tracing::info!(
            from = previous.provider_name(),
            to = next,
            "Switched email provider"
        );
    }

    // =========================================================================
    // Sending
    // =========================================================================

    /// Send one email through the active provider.
    ///
    /// Fills the default sender when `from` is missing. No retries.
    pub async fn send_email(&self, mut options: EmailOptions) -> EmailResponse {
        if options.from.is_none() {
            options.from = self.default_from.clone();
        }

        // Read once: a concurrent switch does not affect this send
        let provider = self.provider();
        let provider_name = provider.provider_name();

        let span = tracing::info_span!(
            "mailroom.send",
            provider = provider_name,
            to = ?options.to.iter().map(|a| &a.email).collect::<Vec<_>>(),
            subject = %options.subject,
        );

        async move {
            tracing::debug!("Sending email");

            #[cfg(feature = "metrics")]
            let start = Instant::now();

            let response = match self.send_timeout {
                Some(limit) => {
                    match tokio::time::timeout(limit, provider.send_email(&options)).await {
                        Ok(response) => response,
                        Err(_) => EmailResponse::from_error(provider_name, &MailError::Timeout(limit)),
                    }
                }
                None => provider.send_email(&options).await,
            };

            #[cfg(feature = "metrics")]
            {
                let status = if response.success { "success" } else { "error" };
                metrics::counter!("mailroom_emails_total", "provider" => provider_name, "status" => status)
                    .increment(1);
                metrics::histogram!("mailroom_delivery_duration_seconds", "provider" => provider_name)
                    .record(start.elapsed().as_secs_f64());
            }

            if response.success {
                tracing::info!(message_id = ?response.id, "Email sent");
            } else {
                tracing::error!(error = ?response.error, "Email delivery failed");
            }
            response
        }
        .instrument(span)
        .await
    }

    /// Send a welcome email rendered from the `welcome` template.
    pub async fn send_welcome_email(&self, to: impl ToAddress, user_name: &str) -> EmailResponse {
        let variables = TemplateVariables::new().set("user_name", user_name);
        self.send_welcome_email_with(to, variables).await
    }

    /// Send a welcome email with caller-supplied template variables.
    ///
    /// `user_email` is filled from the recipient unless given; application
    /// defaults fill any other missing keys.
    pub async fn send_welcome_email_with(
        &self,
        to: impl ToAddress,
        mut variables: TemplateVariables,
    ) -> EmailResponse {
        let to = to.to_address();
        variables.insert_default("user_email", to.email.as_str());
        let subject = format!("Welcome to {}!", self.templates.defaults().app_name);
        let rendered = self.templates.render_welcome(variables);
        self.send_rendered(to, subject, rendered).await
    }

    /// Send a password-reset email rendered from the `password-reset` template.
    pub async fn send_password_reset_email(
        &self,
        to: impl ToAddress,
        user_name: &str,
        reset_url: &str,
    ) -> EmailResponse {
        let variables = TemplateVariables::new()
            .set("user_name", user_name)
            .set("reset_url", reset_url);
        self.send_password_reset_email_with(to, variables).await
    }

    /// Send a password-reset email with caller-supplied template variables.
    pub async fn send_password_reset_email_with(
        &self,
        to: impl ToAddress,
        variables: TemplateVariables,
    ) -> EmailResponse {
        let subject = format!("Reset your {} password", self.templates.defaults().app_name);
        let rendered = self.templates.render_password_reset(variables);
        self.send_rendered(to.to_address(), subject, rendered).await
    }

    /// Send evaluation results rendered from the `evaluation-results` template.
    pub async fn send_evaluation_results_email(
        &self,
        to: impl ToAddress,
        report: &EvaluationReport,
    ) -> EmailResponse {
        let subject = format!("Your {} evaluation results", self.templates.defaults().app_name);
        let rendered = self
            .templates
            .render_evaluation_results(report, TemplateVariables::new());
        self.send_rendered(to.to_address(), subject, rendered).await
    }

    /// Send any template by name, with the application defaults available.
    pub async fn send_template_email(
        &self,
        to: impl ToAddress,
        subject: &str,
        template: &str,
        variables: &TemplateVariables,
    ) -> EmailResponse {
        let rendered = self.templates.render(template, variables.clone());
        self.send_rendered(to.to_address(), subject.to_string(), rendered)
            .await
    }

    /// Send a short message without a template.
    ///
    /// With `is_html`, the message is wrapped in a minimal HTML document and a
    /// plain-text alternative is derived; otherwise it is sent as text.
    pub async fn send_notification_email(
        &self,
        to: impl ToAddress,
        subject: &str,
        message: &str,
        is_html: bool,
    ) -> EmailResponse {
        let options = EmailOptions::new().to(to.to_address()).subject(subject);
        let options = if is_html {
            options.html(notification_shell(message)).text(html_to_text(message))
        } else {
            options.text(message)
        };
        self.send_email(options).await
    }

    /// Send many emails concurrently.
    ///
    /// Every email is attempted; the result at index `i` belongs to the email
    /// at index `i`.
    pub async fn send_bulk_emails(&self, emails: Vec<EmailOptions>) -> Vec<EmailResponse> {
        let count = emails.len();
        let provider = self.provider().provider_name();
        let span = tracing::info_span!("mailroom.send_bulk", provider, count);

        async move {
            let responses = join_all(emails.into_iter().map(|e| self.send_email(e))).await;

            let failed = responses.iter().filter(|r| !r.success).count();
            #[cfg(feature = "metrics")]
            metrics::histogram!("mailroom_batch_size", "provider" => provider).record(count as f64);

            if failed > 0 {
                tracing::warn!(failed, "Bulk send finished with failures");
            } else {
                tracing::info!("Bulk send finished");
            }
            responses
        }
        .instrument(span)
        .await
    }

    async fn send_rendered(
        &self,
        to: Address,
        subject: String,
        rendered: Result<RenderedTemplate, MailError>,
    ) -> EmailResponse {
        match rendered {
            Ok(rendered) => {
                let options = EmailOptions::new()
                    .to(to)
                    .subject(subject)
                    .html(rendered.html)
                    .text(rendered.text);
                self.send_email(options).await
            }
            Err(e) => {
                tracing::error!(to = %to.email, error = %e, "Failed to render email template");
                EmailResponse::from_error(self.provider().provider_name(), &e)
            }
        }
    }
}

/// Fixed HTML document used for HTML notifications.
fn notification_shell(message: &str) -> String {
    format!(
        "<!DOCTYPE html>\
         <html><head><meta charset=\"utf-8\"></head>\
         <body style=\"font-family: Arial, sans-serif; line-height: 1.6; color: #333;\">\
         <div style=\"max-width: 600px; margin: 0 auto; padding: 20px;\">{}</div>\
         </body></html>",
        message
    )
}

/// Builder for [`MailService`].
pub struct MailServiceBuilder {
    provider: Arc<dyn EmailProvider>,
    env: Env,
    templates: Option<EmailTemplates>,
    default_from: Option<Address>,
    send_timeout: Option<Duration>,
}

impl MailServiceBuilder {
    /// Environment used by `switch_provider` and, unless overridden, for
    /// templates.
    pub fn env(mut self, env: Env) -> Self {
        self.env = env;
        self
    }

    pub fn templates(mut self, templates: EmailTemplates) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Sender used when an email has no `from`.
    pub fn default_from(mut self, from: impl ToAddress) -> Self {
        self.default_from = Some(from.to_address());
        self
    }

    /// Give up on a vendor call after `timeout`.
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> MailService {
        MailService {
            provider: RwLock::new(self.provider),
            templates: self
                .templates
                .unwrap_or_else(|| EmailTemplates::from_env(&self.env)),
            default_from: self.default_from,
            send_timeout: self.send_timeout,
            factory: ProviderFactory::new(self.env),
        }
    }
}
