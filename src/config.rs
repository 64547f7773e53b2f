//! Configuration sources.
//!
//! Adapters read their credentials once, at construction, from an [`Env`]
//! snapshot. In production the snapshot is taken from the process environment
//! (after loading an optional `.env` file); tests build one from explicit
//! pairs so they never touch global state.

use std::collections::HashMap;
use std::time::Duration;

use crate::address::Address;

/// An immutable snapshot of configuration variables.
#[derive(Debug, Clone, Default)]
pub struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    /// Snapshot the process environment, loading `.env` first if present.
    pub fn from_process() -> Self {
        dotenvy::dotenv().ok();
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build a snapshot from explicit key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a variable. Empty values count as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Look up a variable, falling back to `default`.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Whether a variable is set to a non-empty value.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Default sender from `EMAIL_FROM` / `EMAIL_FROM_NAME`.
    pub fn default_from(&self) -> Option<Address> {
        let email = self.get("EMAIL_FROM")?;
        Some(match self.get("EMAIL_FROM_NAME") {
            Some(name) => Address::with_name(name, email),
            None => Address::new(email),
        })
    }

    /// Per-send timeout from `EMAIL_SEND_TIMEOUT_SECS`.
    ///
    /// Unparseable or zero values disable the timeout.
    pub fn send_timeout(&self) -> Option<Duration> {
        let raw = self.get("EMAIL_SEND_TIMEOUT_SECS")?;
        match raw.trim().parse::<u64>() {
            Ok(0) => None,
            Ok(secs) => Some(Duration::from_secs(secs)),
            Err(_) => {
                tracing::warn!(value = raw, "Ignoring invalid EMAIL_SEND_TIMEOUT_SECS");
                None
            }
        }
    }
}

/// Optional per-provider overrides passed to the
/// [`ProviderFactory`](crate::ProviderFactory).
///
/// Unset fields fall back to the environment.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    /// API key (ignored by SMTP, which uses `SMTP_*` variables).
    pub api_key: Option<String>,
    /// Sender used when an email carries no `from`.
    pub default_from: Option<Address>,
    /// Custom API base URL (for mock servers or regional endpoints).
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the default sender.
    pub fn default_from(mut self, from: impl Into<Address>) -> Self {
        self.default_from = Some(from.into());
        self
    }

    /// Set a custom base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
}
