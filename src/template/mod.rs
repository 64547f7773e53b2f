//! Template rendering: a file-backed `{{placeholder}}` engine and the
//! notification-specific renderers built on it.

mod emails;
mod engine;
mod variables;

pub use emails::{
    recommendations_html, EmailTemplates, EvaluationReport, ScoreTier, TemplateDefaults,
    CAUTIONARY_THRESHOLD, EVALUATION_RESULTS_TEMPLATE, PASSWORD_RESET_TEMPLATE,
    POSITIVE_THRESHOLD, WELCOME_TEMPLATE,
};
pub use engine::{html_to_text, render_str, RenderedTemplate, TemplateEngine, DEFAULT_TEMPLATES_DIR};
pub use variables::{TemplateValue, TemplateVariables};
