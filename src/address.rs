//! Email address type with optional display name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An email address with an optional display name.
///
/// ```
/// use mailroom::Address;
///
/// let addr: Address = "user@example.com".into();
/// assert_eq!(addr.formatted(), "user@example.com");
///
/// let addr: Address = ("Ada", "ada@example.com").into();
/// assert_eq!(addr.formatted(), "Ada <ada@example.com>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Optional display name (e.g., "Ada Lovelace")
    pub name: Option<String>,
    /// Email address (e.g., "ada@example.com")
    pub email: String,
}

impl Address {
    /// Create an address with just an email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: None,
            email: email.into(),
        }
    }

    /// Create an address with a display name.
    ///
    /// An empty name is treated as no name.
    pub fn with_name(name: impl Into<String>, email: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            name: if name.is_empty() { None } else { Some(name) },
            email: email.into(),
        }
    }

    /// Format as "Name <email>" or just "email" if no name.
    pub fn formatted(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl From<&str> for Address {
    fn from(email: &str) -> Self {
        Self::new(email)
    }
}

impl From<String> for Address {
    fn from(email: String) -> Self {
        Self::new(email)
    }
}

impl From<&String> for Address {
    fn from(email: &String) -> Self {
        Self::new(email.as_str())
    }
}

impl<N: Into<String>, E: Into<String>> From<(N, E)> for Address {
    fn from((name, email): (N, E)) -> Self {
        Self::with_name(name, email)
    }
}

/// Trait for application types that can act as a recipient.
///
/// ```
/// use mailroom::{Address, ToAddress};
///
/// struct User {
///     name: String,
///     email: String,
/// }
///
/// impl ToAddress for User {
///     fn to_address(&self) -> Address {
///         Address::with_name(&self.name, &self.email)
///     }
/// }
/// ```
pub trait ToAddress {
    fn to_address(&self) -> Address;
}

impl<T: ToAddress + ?Sized> ToAddress for &T {
    fn to_address(&self) -> Address {
        (*self).to_address()
    }
}

impl ToAddress for Address {
    fn to_address(&self) -> Address {
        self.clone()
    }
}

impl ToAddress for str {
    fn to_address(&self) -> Address {
        Address::new(self)
    }
}

impl ToAddress for String {
    fn to_address(&self) -> Address {
        Address::new(self.as_str())
    }
}

impl<N: AsRef<str>, E: AsRef<str>> ToAddress for (N, E) {
    fn to_address(&self) -> Address {
        Address::with_name(self.0.as_ref(), self.1.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted() {
        assert_eq!(Address::new("a@example.com").formatted(), "a@example.com");
        assert_eq!(
            Address::with_name("Ada", "ada@example.com").formatted(),
            "Ada <ada@example.com>"
        );
    }

    #[test]
    fn test_empty_name_is_dropped() {
        let addr = Address::with_name("", "ada@example.com");
        assert_eq!(addr.name, None);
        assert_eq!(addr.to_string(), "ada@example.com");
    }

    #[test]
    fn test_to_address_for_tuple() {
        let addr = ("Grace", "grace@example.com").to_address();
        assert_eq!(addr.name.as_deref(), Some("Grace"));
        assert_eq!(addr.email, "grace@example.com");
    }
}
