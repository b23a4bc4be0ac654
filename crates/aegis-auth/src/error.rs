//! Authentication and access error types.
//!
//! [`AuthError`] is the outcome taxonomy returned across the
//! registration / sign-in boundary. [`AccessDenied`] details why a gate
//! refused access and maps onto the layers of the access model:
//!
//! ```text
//! Access = Session(WHO) ∩ Role ∩ Tier ∩ Entitlement
//!             │            │      │        │
//!     NotAuthenticated     │  InsufficientTier  MissingEntitlement
//!                  InsufficientRole / VerificationFailed
//! ```

use crate::Entitlement;
use aegis_types::{Email, ErrorCode, Role, SubscriptionTier};
use thiserror::Error;

/// Why a protected view or feature was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    /// No session exists.
    #[error("not signed in")]
    NotAuthenticated,

    /// The session's role is below the required role.
    #[error("role denied: requires {required}, have {actual}")]
    InsufficientRole {
        /// Minimum role.
        required: Role,
        /// Role the caller holds.
        actual: Role,
    },

    /// The identity's tier is below the required tier.
    #[error("tier denied: requires {required}, have {actual}")]
    InsufficientTier {
        /// Minimum tier.
        required: SubscriptionTier,
        /// Tier the identity holds.
        actual: SubscriptionTier,
    },

    /// The identity's tier does not unlock the requested features.
    #[error("feature denied: {missing} not included in {tier} (requires {})", .missing.minimum_tier())]
    MissingEntitlement {
        /// Features that are required but not granted.
        missing: Entitlement,
        /// Tier the identity holds.
        tier: SubscriptionTier,
    },

    /// The entitlement source failed to answer (remote role service error,
    /// unreadable tier). Treated exactly like a failed check.
    #[error("verification failed: {0}")]
    VerificationFailed(String),
}

impl AccessDenied {
    /// Returns the access layer that denied.
    #[must_use]
    pub fn layer(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "session",
            Self::InsufficientRole { .. } => "role",
            Self::InsufficientTier { .. } => "tier",
            Self::MissingEntitlement { .. } => "entitlement",
            Self::VerificationFailed(_) => "verification",
        }
    }
}

impl ErrorCode for AccessDenied {
    fn code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "ACCESS_NOT_AUTHENTICATED",
            Self::InsufficientRole { .. } => "ACCESS_INSUFFICIENT_ROLE",
            Self::InsufficientTier { .. } => "ACCESS_INSUFFICIENT_TIER",
            Self::MissingEntitlement { .. } => "ACCESS_MISSING_ENTITLEMENT",
            Self::VerificationFailed(_) => "ACCESS_VERIFICATION_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        // Signing in or upgrading fixes these; a role does not change on retry.
        matches!(
            self,
            Self::NotAuthenticated | Self::InsufficientTier { .. } | Self::MissingEntitlement { .. }
        )
    }
}

/// Outcome errors of the identity layer.
///
/// Returned as values, never panicked across the sign-in / registration
/// boundary. Nothing here is fatal: the worst case is "sign in again".
#[derive(Debug, Error)]
pub enum AuthError {
    /// An account with this normalized email already exists.
    #[error("an account for '{email}' already exists")]
    DuplicateEmail {
        /// The normalized email that collided.
        email: Email,
    },

    /// Sign-in failed.
    ///
    /// Deliberately does not say whether the email is unknown or the
    /// password is wrong.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// A gate refused access.
    #[error("insufficient role: {0}")]
    InsufficientRole(#[from] AccessDenied),

    /// The host blocks or lost persistent storage.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl AuthError {
    /// Creates a `DuplicateEmail` error.
    pub fn duplicate_email(email: impl Into<Email>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }

    /// Creates a `StorageUnavailable` error.
    pub fn storage_unavailable(reason: impl Into<String>) -> Self {
        Self::StorageUnavailable(reason.into())
    }
}

impl ErrorCode for AuthError {
    fn code(&self) -> &'static str {
        match self {
            Self::DuplicateEmail { .. } => "AUTH_DUPLICATE_EMAIL",
            Self::InvalidCredentials => "AUTH_INVALID_CREDENTIALS",
            Self::InsufficientRole(_) => "AUTH_INSUFFICIENT_ROLE",
            Self::StorageUnavailable(_) => "AUTH_STORAGE_UNAVAILABLE",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::DuplicateEmail { .. } | Self::InvalidCredentials)
    }
}
