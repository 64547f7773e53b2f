//! In-memory provider for development and tests.
//!
//! Captures every accepted email instead of sending it, and can be told to
//! fail so error paths can be exercised.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mailroom::{MailService, providers::MemoryProvider};
//!
//! let memory = Arc::new(MemoryProvider::new());
//! let service = MailService::builder(memory.clone()).build();
//!
//! service.send_notification_email("ada@example.com", "Hi", "Hello", false).await;
//! assert_eq!(memory.email_count(), 1);
//! ```

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::MailError;
use crate::options::EmailOptions;
use crate::provider::{require_recipients, EmailProvider};

/// Provider that stores emails in memory.
pub struct MemoryProvider {
    sent: Mutex<Vec<EmailOptions>>,
    fail_with: RwLock<Option<String>>,
    fail_for: RwLock<HashMap<String, String>>,
    configured: bool,
    delay: Option<Duration>,
}

impl MemoryProvider {
    /// Create a configured, empty provider.
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: RwLock::new(None),
            fail_for: RwLock::new(HashMap::new()),
            configured: true,
            delay: None,
        }
    }

    /// Create a provider that reports itself unconfigured.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    /// Sleep before completing each delivery.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    // =========================================================================
    // Failure Simulation
    // =========================================================================

    /// Fail every delivery with the given message.
    pub fn set_failure(&self, message: impl Into<String>) {
        *self.fail_with.write() = Some(message.into());
    }

    /// Fail deliveries addressed to `recipient` (case-insensitive).
    pub fn fail_for(&self, recipient: &str, message: impl Into<String>) {
        self.fail_for
            .write()
            .insert(recipient.to_ascii_lowercase(), message.into());
    }

    /// Clear all failure rules.
    pub fn clear_failure(&self) {
        *self.fail_with.write() = None;
        self.fail_for.write().clear();
    }

    // =========================================================================
    // Captured Emails
    // =========================================================================

    /// All captured emails, oldest first.
    pub fn emails(&self) -> Vec<EmailOptions> {
        self.sent.lock().clone()
    }

    /// The most recently captured email.
    pub fn last_email(&self) -> Option<EmailOptions> {
        self.sent.lock().last().cloned()
    }

    /// Number of captured emails.
    pub fn email_count(&self) -> usize {
        self.sent.lock().len()
    }

    /// Whether an email was captured for `recipient`.
    pub fn sent_to(&self, recipient: &str) -> bool {
        self.sent.lock().iter().any(|e| {
            e.to
                .iter()
                .any(|addr| addr.email.eq_ignore_ascii_case(recipient))
        })
    }

    /// Remove and return all captured emails.
    pub fn flush(&self) -> Vec<EmailOptions> {
        std::mem::take(&mut *self.sent.lock())
    }

    fn failure_for(&self, options: &EmailOptions) -> Option<String> {
        if let Some(message) = self.fail_with.read().clone() {
            return Some(message);
        }
        let rules = self.fail_for.read();
        options
            .all_recipients()
            .find_map(|addr| rules.get(&addr.email.to_ascii_lowercase()).cloned())
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailProvider for MemoryProvider {
    async fn deliver(&self, options: &EmailOptions) -> Result<Option<String>, MailError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        require_recipients(options)?;
        if let Some(message) = self.failure_for(options) {
            return Err(MailError::provider("memory", message));
        }

        let id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(
            message_id = %id,
            to = ?options.to.iter().map(|a| &a.email).collect::<Vec<_>>(),
            subject = %options.subject,
            "Email captured"
        );
        self.sent.lock().push(options.clone());
        Ok(Some(id))
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
