//! User roles.

use serde::{Deserialize, Serialize};

/// Role attached to a user record and copied into its session.
///
/// Persisted as `"USER"` / `"ADMIN"`. Ordered so that `Admin > User`,
/// which lets access checks express "at least this role" with `>=`.
///
/// # Example
///
/// ```
/// use aegis_types::Role;
///
/// assert!(Role::Admin > Role::User);
/// assert_eq!(Role::default(), Role::User);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular account. Every registration starts here.
    #[default]
    User,
    /// Administrative account.
    Admin,
}

impl Role {
    /// Returns the persisted tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }

    /// Returns `true` for [`Role::Admin`].
    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_uppercase_tags() {
        assert_eq!(
            serde_json::to_string(&Role::Admin).expect("serialize"),
            "\"ADMIN\""
        );
        let role: Role = serde_json::from_str("\"USER\"").expect("deserialize");
        assert_eq!(role, Role::User);
    }

    #[test]
    fn lowercase_tag_is_rejected() {
        assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
    }

    #[test]
    fn admin_outranks_user() {
        assert!(Role::Admin > Role::User);
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
    }
}
