//! Placeholder used when no vendor adapter is compiled in.

use async_trait::async_trait;

use crate::error::MailError;
use crate::options::EmailOptions;
use crate::provider::EmailProvider;

/// A provider that is never configured and fails every send.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledProvider;

#[async_trait]
impl EmailProvider for DisabledProvider {
    async fn deliver(&self, _options: &EmailOptions) -> Result<Option<String>, MailError> {
        Err(MailError::NotConfigured("none"))
    }

    fn is_configured(&self) -> bool {
        false
    }

    fn provider_name(&self) -> &'static str {
        "none"
    }
}
