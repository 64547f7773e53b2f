//! `EmailOptions`: the provider-neutral description of one email.

use serde::{Deserialize, Serialize};

use crate::address::{Address, ToAddress};

/// A single email to send, independent of the vendor that delivers it.
///
/// Use the builder methods to construct one:
///
/// ```
/// use mailroom::EmailOptions;
///
/// let options = EmailOptions::new()
///     .to("ada@example.com")
///     .subject("Welcome!")
///     .html("<h1>Hello</h1>")
///     .text("Hello");
/// ```
///
/// `to` and `subject` are mandatory. At least one of `html` / `text` should be
/// present, but an options value with neither is still handed to the vendor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailOptions {
    /// Sender address. Filled from the service default when absent.
    pub from: Option<Address>,
    /// Primary recipients
    pub to: Vec<Address>,
    /// Carbon copy recipients
    pub cc: Vec<Address>,
    /// Blind carbon copy recipients
    pub bcc: Vec<Address>,
    /// Reply-to address
    pub reply_to: Option<Address>,
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html: Option<String>,
    /// Plain text body
    pub text: Option<String>,
}

impl EmailOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sender address.
    pub fn from(mut self, addr: impl ToAddress) -> Self {
        self.from = Some(addr.to_address());
        self
    }

    /// Add a recipient. Can be called multiple times.
    pub fn to(mut self, addr: impl ToAddress) -> Self {
        self.to.push(addr.to_address());
        self
    }

    /// Add a CC recipient.
    pub fn cc(mut self, addr: impl ToAddress) -> Self {
        self.cc.push(addr.to_address());
        self
    }

    /// Add a BCC recipient.
    pub fn bcc(mut self, addr: impl ToAddress) -> Self {
        self.bcc.push(addr.to_address());
        self
    }

    /// Set the reply-to address.
    pub fn reply_to(mut self, addr: impl ToAddress) -> Self {
        self.reply_to = Some(addr.to_address());
        self
    }

    /// Set the subject line.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set the HTML body.
    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html = Some(body.into());
        self
    }

    /// Set the plain text body.
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text = Some(body.into());
        self
    }

    /// Whether the email carries any body at all.
    pub fn has_body(&self) -> bool {
        self.html.is_some() || self.text.is_some()
    }

    /// All recipients (to + cc + bcc).
    pub fn all_recipients(&self) -> impl Iterator<Item = &Address> {
        self.to.iter().chain(self.cc.iter()).chain(self.bcc.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = EmailOptions::new()
            .from("sender@example.com")
            .to("one@example.com")
            .to(("Two", "two@example.com"))
            .cc("cc@example.com")
            .bcc("bcc@example.com")
            .reply_to("reply@example.com")
            .subject("Hi")
            .text("Hello");

        assert_eq!(options.from.unwrap().email, "sender@example.com");
        assert_eq!(options.to.len(), 2);
        assert_eq!(options.to[1].name.as_deref(), Some("Two"));
        assert_eq!(options.reply_to.unwrap().email, "reply@example.com");
        assert_eq!(options.subject, "Hi");
        assert_eq!(options.text.as_deref(), Some("Hello"));
        assert_eq!(options.html, None);
    }

    #[test]
    fn test_has_body() {
        assert!(!EmailOptions::new().has_body());
        assert!(EmailOptions::new().html("<p>x</p>").has_body());
        assert!(EmailOptions::new().text("x").has_body());
    }

    #[test]
    fn test_all_recipients() {
        let options = EmailOptions::new()
            .to("a@example.com")
            .cc("b@example.com")
            .bcc("c@example.com");
        let emails: Vec<_> = options.all_recipients().map(|a| a.email.as_str()).collect();
        assert_eq!(emails, ["a@example.com", "b@example.com", "c@example.com"]);
    }
}
