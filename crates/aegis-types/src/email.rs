//! Normalized email identity.

use serde::{Deserialize, Serialize};

/// A user identity key, normalized at construction.
///
/// Normalization trims surrounding whitespace and lowercases the whole
/// address, so `"ANA@X.COM"` and `" ana@x.com"` are the same identity.
/// Every registry lookup, session record and tier key goes through this
/// type, which keeps the registry and the tier store joined on one key.
///
/// Deserialization normalizes too: a hand-edited `"Ana@X.com"` in storage
/// still compares equal to `"ana@x.com"`.
///
/// # Example
///
/// ```
/// use aegis_types::Email;
///
/// assert_eq!(Email::new("ANA@X.COM"), Email::new("ana@x.com"));
/// assert_eq!(Email::new(" ana@x.com\n").as_str(), "ana@x.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Creates a normalized email.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_lowercase())
    }

    /// Returns the normalized address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the normalized address is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Email {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for Email {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
