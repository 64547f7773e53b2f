//! File-backed template engine.
//!
//! A template is an HTML file named `<name>.html` inside the template
//! directory. Rendering substitutes `{{identifier}}` placeholders and derives
//! a plain-text body from the result. Files are read on every render; nothing
//! is cached.

use regex::{Captures, Regex};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::Env;
use crate::error::MailError;

use super::variables::TemplateVariables;

/// Directory used when `EMAIL_TEMPLATES_DIR` is not set.
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

const TEMPLATE_EXTENSION: &str = "html";

/// HTML and derived plain-text output of a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    pub html: String,
    pub text: String,
}

/// Loads templates by name from a directory and renders them.
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    dir: PathBuf,
}

impl TemplateEngine {
    /// Create an engine reading templates from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Use `EMAIL_TEMPLATES_DIR`, or [`DEFAULT_TEMPLATES_DIR`].
    pub fn from_env(env: &Env) -> Self {
        Self::new(env.get_or("EMAIL_TEMPLATES_DIR", DEFAULT_TEMPLATES_DIR))
    }

    /// The template directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map a name to its file. Names that would escape the directory do not
    /// resolve.
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return None;
        }
        Some(self.dir.join(format!("{}.{}", name, TEMPLATE_EXTENSION)))
    }

    /// Render the named template.
    ///
    /// Fails with [`MailError::TemplateNotFound`] if no such template exists.
    /// Placeholders without a matching variable are left as-is.
    pub fn render_template(
        &self,
        name: &str,
        variables: &TemplateVariables,
    ) -> Result<RenderedTemplate, MailError> {
        let path = self
            .resolve(name)
            .ok_or_else(|| MailError::TemplateNotFound(name.to_string()))?;

        let source = match std::fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(MailError::TemplateNotFound(name.to_string()));
            }
            Err(e) => {
                return Err(MailError::Template(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        tracing::debug!(template = name, path = %path.display(), "Loaded email template");

        let html = render_str(&source, variables);
        let text = html_to_text(&html);
        Ok(RenderedTemplate { html, text })
    }

    /// Whether a template with this name exists.
    pub fn template_exists(&self, name: &str) -> bool {
        self.resolve(name).is_some_and(|path| path.is_file())
    }

    /// Names of all templates in the directory, sorted.
    ///
    /// Returns an empty list if the directory cannot be read.
    pub fn list_templates(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "Cannot list email templates");
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path.extension().and_then(|e| e.to_str()) == Some(TEMPLATE_EXTENSION)
            })
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect();
        names.sort();
        names
    }
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid placeholder regex"))
}

/// Substitute `{{identifier}}` placeholders in `source`.
///
/// Placeholders whose key is missing from `variables` are kept verbatim.
pub fn render_str(source: &str, variables: &TemplateVariables) -> String {
    placeholder_regex()
        .replace_all(source, |caps: &Captures| match variables.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

struct TextPatterns {
    blocks: Regex,
    tags: Regex,
    whitespace: Regex,
}

fn text_patterns() -> &'static TextPatterns {
    static PATTERNS: OnceLock<TextPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| TextPatterns {
        blocks: Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>|<script\b[^>]*>.*?</script\s*>")
            .expect("valid block regex"),
        tags: Regex::new(r"<[^>]*>").expect("valid tag regex"),
        whitespace: Regex::new(r"\s+").expect("valid whitespace regex"),
    })
}

/// Derive a plain-text body from HTML.
///
/// Lossy: drops `<style>`/`<script>` blocks and every tag, decodes a minimal
/// entity set, and collapses whitespace.
///
/// ```
/// use mailroom::html_to_text;
///
/// assert_eq!(html_to_text("<p>Hello <b>World</b></p>"), "Hello World");
/// ```
pub fn html_to_text(html: &str) -> String {
    let patterns = text_patterns();
    let without_blocks = patterns.blocks.replace_all(html, "");
    let without_tags = patterns.tags.replace_all(&without_blocks, "");

    // &amp; last so "&amp;lt;" stays "&lt;"
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    patterns
        .whitespace
        .replace_all(&decoded, " ")
        .trim()
        .to_string()
}
