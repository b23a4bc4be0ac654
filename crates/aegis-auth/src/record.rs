//! User and session records.

use aegis_types::{Email, Role};
use serde::{Deserialize, Serialize};

/// One registered account.
///
/// Created only by registration; this layer never edits or deletes a
/// record. The password is an opaque comparison value stored as given.
///
/// Persisted shape: `{"email", "password", "name", "role"}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Normalized identity key.
    pub email: Email,
    /// Comparison value, stored verbatim.
    pub password: String,
    /// Display name.
    pub name: String,
    /// Account role. Registration always assigns [`Role::User`].
    #[serde(default)]
    pub role: Role,
}

impl UserRecord {
    /// Creates a new record with [`Role::User`].
    ///
    /// The registrant cannot choose a role; there is no constructor
    /// taking one.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<Email>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: name.into(),
            role: Role::User,
        }
    }

    /// Returns `true` if `email` and `password` both match this record.
    ///
    /// `email` is compared normalized, `password` exactly.
    #[must_use]
    pub fn matches(&self, email: &Email, password: &str) -> bool {
        &self.email == email && self.password == password
    }
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("role", &self.role)
            .finish()
    }
}

/// The single "current session" record.
///
/// A projection of the matched [`UserRecord`] taken at sign-in. It is a
/// copy, not a live reference: later registry changes do not reach it.
/// Its presence in storage is the definition of being authenticated.
///
/// Persisted shape: `{"name", "role", "email"}`.
///
/// # Example
///
/// ```
/// use aegis_auth::{SessionRecord, UserRecord, Role};
///
/// let user = UserRecord::new("Ana", "ANA@x.com", "secret1");
/// let session = SessionRecord::from_user(&user);
/// assert_eq!(session.email.as_str(), "ana@x.com");
/// assert_eq!(session.role, Role::User);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Display name at sign-in time.
    pub name: String,
    /// Role at sign-in time.
    pub role: Role,
    /// Identity key.
    pub email: Email,
}

impl SessionRecord {
    /// Projects a session from a user record.
    #[must_use]
    pub fn from_user(user: &UserRecord) -> Self {
        Self {
            name: user.name.clone(),
            role: user.role,
            email: user.email.clone(),
        }
    }
}

impl std::fmt::Display for SessionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}<{}>@{}", self.name, self.email, self.role)
    }
}
