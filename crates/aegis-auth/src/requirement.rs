//! Access requirements for protected views and features.

use crate::{resolve, AccessDenied, Entitlement, SessionRecord};
use aegis_types::{Role, SubscriptionTier};
use serde::{Deserialize, Serialize};

/// What a protected view demands of the caller.
///
/// Every requirement implies a session. On top of that it may demand a
/// minimum role, a minimum tier, and a set of features. All parts must
/// pass; the first failing layer is reported.
///
/// # Example
///
/// ```
/// use aegis_auth::{AccessRequirement, Entitlement, SessionRecord, SubscriptionTier, UserRecord};
///
/// let lab = AccessRequirement::feature(Entitlement::NEURAL_LAB);
/// let session = SessionRecord::from_user(&UserRecord::new("Ana", "ana@x.com", "p"));
///
/// assert!(lab.check(Some(&session), SubscriptionTier::Free).is_err());
/// assert!(lab.check(Some(&session), SubscriptionTier::Core).is_ok());
/// assert!(lab.check(None, SubscriptionTier::Shield).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequirement {
    /// Minimum role, if any.
    pub min_role: Option<Role>,
    /// Minimum tier, if any.
    pub min_tier: Option<SubscriptionTier>,
    /// Features that must all be unlocked.
    pub features: Entitlement,
}

impl Default for AccessRequirement {
    fn default() -> Self {
        Self {
            min_role: None,
            min_tier: None,
            features: Entitlement::empty(),
        }
    }
}

impl AccessRequirement {
    /// Requires only a session.
    #[must_use]
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Requires a session whose tier unlocks `features`.
    #[must_use]
    pub fn feature(features: Entitlement) -> Self {
        Self::authenticated().with_features(features)
    }

    /// Requires a session with at least `tier`.
    #[must_use]
    pub fn tier(tier: SubscriptionTier) -> Self {
        Self::authenticated().with_tier(tier)
    }

    /// Requires an administrator session.
    #[must_use]
    pub fn admin() -> Self {
        Self::authenticated().with_role(Role::Admin)
    }

    /// Sets the minimum role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.min_role = Some(role);
        self
    }

    /// Sets the minimum tier.
    #[must_use]
    pub fn with_tier(mut self, tier: SubscriptionTier) -> Self {
        self.min_tier = Some(tier);
        self
    }

    /// Adds required features.
    #[must_use]
    pub fn with_features(mut self, features: Entitlement) -> Self {
        self.features |= features;
        self
    }

    /// Returns `true` if a tier must be read to decide.
    #[must_use]
    pub fn needs_tier(&self) -> bool {
        self.min_tier.is_some() || !self.features.is_empty()
    }

    /// Checks the role layer.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied::InsufficientRole`] if `role` is below the minimum.
    pub fn check_role(&self, role: Role) -> Result<(), AccessDenied> {
        match self.min_role {
            Some(required) if role < required => Err(AccessDenied::InsufficientRole {
                required,
                actual: role,
            }),
            _ => Ok(()),
        }
    }

    /// Checks the tier and entitlement layers.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied::InsufficientTier`] or
    /// [`AccessDenied::MissingEntitlement`].
    pub fn check_tier(&self, tier: SubscriptionTier) -> Result<(), AccessDenied> {
        if let Some(required) = self.min_tier {
            if tier < required {
                return Err(AccessDenied::InsufficientTier {
                    required,
                    actual: tier,
                });
            }
        }

        let missing = self.features.difference(resolve(tier));
        if !missing.is_empty() {
            return Err(AccessDenied::MissingEntitlement { missing, tier });
        }

        Ok(())
    }

    /// Checks every layer against a session and its tier.
    ///
    /// # Errors
    ///
    /// Returns the first [`AccessDenied`] in layer order: session, role, tier.
    pub fn check(
        &self,
        session: Option<&SessionRecord>,
        tier: SubscriptionTier,
    ) -> Result<(), AccessDenied> {
        let session = session.ok_or(AccessDenied::NotAuthenticated)?;
        self.check_role(session.role)?;
        self.check_tier(tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserRecord;

    fn session(role: Role) -> SessionRecord {
        let mut user = UserRecord::new("Ana", "ana@x.com", "secret1");
        user.role = role;
        SessionRecord::from_user(&user)
    }

    #[test]
    fn authenticated_only_needs_session() {
        let req = AccessRequirement::authenticated();
        assert!(!req.needs_tier());
        assert!(req.check(Some(&session(Role::User)), SubscriptionTier::Free).is_ok());
        assert_eq!(
            req.check(None, SubscriptionTier::Shield),
            Err(AccessDenied::NotAuthenticated)
        );
    }

    #[test]
    fn core_or_above_feature() {
        let req = AccessRequirement::tier(SubscriptionTier::Core);
        let s = session(Role::User);

        assert!(matches!(
            req.check(Some(&s), SubscriptionTier::Free),
            Err(AccessDenied::InsufficientTier { .. })
        ));
        assert!(req.check(Some(&s), SubscriptionTier::Core).is_ok());
        assert!(req.check(Some(&s), SubscriptionTier::Shield).is_ok());
    }

    #[test]
    fn feature_requirement_reports_missing_flags() {
        let req = AccessRequirement::feature(Entitlement::NEURAL_LAB | Entitlement::SENTINEL_PROTOCOL);
        let err = req
            .check(Some(&session(Role::User)), SubscriptionTier::Core)
            .unwrap_err();
        assert_eq!(
            err,
            AccessDenied::MissingEntitlement {
                missing: Entitlement::SENTINEL_PROTOCOL,
                tier: SubscriptionTier::Core,
            }
        );
    }

    #[test]
    fn admin_requirement() {
        let req = AccessRequirement::admin();
        assert!(matches!(
            req.check(Some(&session(Role::User)), SubscriptionTier::Shield),
            Err(AccessDenied::InsufficientRole { .. })
        ));
        assert!(req
            .check(Some(&session(Role::Admin)), SubscriptionTier::Free)
            .is_ok());
    }

    #[test]
    fn role_checked_before_tier() {
        let req = AccessRequirement::admin().with_tier(SubscriptionTier::Shield);
        let err = req
            .check(Some(&session(Role::User)), SubscriptionTier::Free)
            .unwrap_err();
        assert_eq!(err.layer(), "role");
    }

    #[test]
    fn with_features_accumulates() {
        let req = AccessRequirement::authenticated()
            .with_features(Entitlement::NEURAL_LAB)
            .with_features(Entitlement::LIVE_SPECTRAL_ANALYSIS);
        assert_eq!(
            req.features,
            Entitlement::NEURAL_LAB | Entitlement::LIVE_SPECTRAL_ANALYSIS
        );
        assert!(req.needs_tier());
    }
}
