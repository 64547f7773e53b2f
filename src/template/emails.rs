//! Renderers for the product's notification emails.
//!
//! Each renderer merges caller variables with application defaults
//! (`base_url`, `support_email`, `app_name`, `current_year`) and delegates to
//! the [`TemplateEngine`]. Caller-supplied keys always win over defaults.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::config::Env;
use crate::error::MailError;

use super::engine::{RenderedTemplate, TemplateEngine};
use super::variables::TemplateVariables;

pub const WELCOME_TEMPLATE: &str = "welcome";
pub const PASSWORD_RESET_TEMPLATE: &str = "password-reset";
pub const EVALUATION_RESULTS_TEMPLATE: &str = "evaluation-results";

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_SUPPORT_EMAIL: &str = "support@example.com";
const DEFAULT_APP_NAME: &str = "Mailroom";

/// Score at or above which results are shown as positive.
pub const POSITIVE_THRESHOLD: f64 = 70.0;
/// Score at or above which results are shown as cautionary.
pub const CAUTIONARY_THRESHOLD: f64 = 50.0;

/// Display tier derived from an evaluation score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    Positive,
    Cautionary,
    Warning,
}

impl ScoreTier {
    /// `>= 70` positive, `>= 50` cautionary, anything else (including NaN)
    /// warning.
    pub fn from_score(score: f64) -> Self {
        if score >= POSITIVE_THRESHOLD {
            Self::Positive
        } else if score >= CAUTIONARY_THRESHOLD {
            Self::Cautionary
        } else {
            Self::Warning
        }
    }

    /// Hex color used for the score badge.
    pub fn color(self) -> &'static str {
        match self {
            Self::Positive => "#10b981",
            Self::Cautionary => "#f59e0b",
            Self::Warning => "#ef4444",
        }
    }

    /// Headline shown next to the score.
    pub fn message(self) -> &'static str {
        match self {
            Self::Positive => "Excellent work! You have a strong grasp of the material.",
            Self::Cautionary => "Good effort. A few areas could use more practice.",
            Self::Warning => "There is room to improve. Start with the recommendations below.",
        }
    }
}

/// Input for the evaluation-results email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub user_name: String,
    pub score: f64,
    /// Shown in the given order.
    pub recommendations: Vec<String>,
}

impl EvaluationReport {
    pub fn new(user_name: impl Into<String>, score: f64) -> Self {
        Self {
            user_name: user_name.into(),
            score,
            recommendations: Vec::new(),
        }
    }

    /// Append a recommendation.
    pub fn recommendation(mut self, text: impl Into<String>) -> Self {
        self.recommendations.push(text.into());
        self
    }

    pub fn tier(&self) -> ScoreTier {
        ScoreTier::from_score(self.score)
    }
}

/// Application-level values available to every template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDefaults {
    pub base_url: String,
    pub support_email: String,
    pub app_name: String,
}

impl TemplateDefaults {
    /// Read `APP_BASE_URL`, `SUPPORT_EMAIL` and `APP_NAME`.
    pub fn from_env(env: &Env) -> Self {
        Self {
            base_url: env.get_or("APP_BASE_URL", DEFAULT_BASE_URL).to_string(),
            support_email: env.get_or("SUPPORT_EMAIL", DEFAULT_SUPPORT_EMAIL).to_string(),
            app_name: env.get_or("APP_NAME", DEFAULT_APP_NAME).to_string(),
        }
    }
}

impl Default for TemplateDefaults {
    fn default() -> Self {
        Self::from_env(&Env::default())
    }
}

/// Renders welcome, password-reset and evaluation-results emails.
#[derive(Debug, Clone)]
pub struct EmailTemplates {
    engine: TemplateEngine,
    defaults: TemplateDefaults,
}

impl EmailTemplates {
    pub fn new(engine: TemplateEngine, defaults: TemplateDefaults) -> Self {
        Self { engine, defaults }
    }

    pub fn from_env(env: &Env) -> Self {
        Self::new(TemplateEngine::from_env(env), TemplateDefaults::from_env(env))
    }

    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    pub fn defaults(&self) -> &TemplateDefaults {
        &self.defaults
    }

    fn with_defaults(&self, mut variables: TemplateVariables) -> TemplateVariables {
        variables.insert_default("base_url", self.defaults.base_url.as_str());
        variables.insert_default("support_email", self.defaults.support_email.as_str());
        variables.insert_default("app_name", self.defaults.app_name.as_str());
        variables.insert_default("current_year", chrono::Utc::now().year());
        variables
    }

    /// Render any template with the defaults applied.
    pub fn render(
        &self,
        name: &str,
        variables: TemplateVariables,
    ) -> Result<RenderedTemplate, MailError> {
        self.engine.render_template(name, &self.with_defaults(variables))
    }

    /// Render the `welcome` template.
    pub fn render_welcome(
        &self,
        variables: TemplateVariables,
    ) -> Result<RenderedTemplate, MailError> {
        self.engine
            .render_template(WELCOME_TEMPLATE, &self.with_defaults(variables))
    }

    /// Render the `password-reset` template.
    pub fn render_password_reset(
        &self,
        variables: TemplateVariables,
    ) -> Result<RenderedTemplate, MailError> {
        self.engine
            .render_template(PASSWORD_RESET_TEMPLATE, &self.with_defaults(variables))
    }

    /// Render the `evaluation-results` template.
    ///
    /// Adds `user_name`, `score`, `score_color`, `score_message` and the
    /// `recommendations` markup on top of `extra`.
    pub fn render_evaluation_results(
        &self,
        report: &EvaluationReport,
        extra: TemplateVariables,
    ) -> Result<RenderedTemplate, MailError> {
        let tier = report.tier();
        let mut variables = extra;
        variables.insert("user_name", report.user_name.as_str());
        variables.insert("score", report.score);
        variables.insert("score_color", tier.color());
        variables.insert("score_message", tier.message());
        variables.insert(
            "recommendations",
            recommendations_html(&report.recommendations),
        );
        self.engine
            .render_template(EVALUATION_RESULTS_TEMPLATE, &self.with_defaults(variables))
    }
}

/// One `<div class="recommendation">` per item, in order.
pub fn recommendations_html(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("<div class=\"recommendation\">{}</div>", escape_html(item)))
        .collect()
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
