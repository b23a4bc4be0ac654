//! Subscription tiers.

use crate::ErrorCode;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Subscription tier of an identity.
///
/// Tiers are totally ordered by capability: `Free < Core < Shield`, and
/// every higher tier grants a superset of the lower tier's features.
/// Persisted as the lowercase tags `"free"`, `"core"`, `"shield"`.
///
/// # Example
///
/// ```
/// use aegis_types::SubscriptionTier;
///
/// let tier: SubscriptionTier = "core".parse().unwrap();
/// assert_eq!(tier, SubscriptionTier::Core);
/// assert!(tier < SubscriptionTier::Shield);
/// assert!("platinum".parse::<SubscriptionTier>().is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    /// No paid features.
    #[default]
    Free,
    /// Mid tier.
    Core,
    /// Every feature.
    Shield,
}

impl SubscriptionTier {
    /// All tiers in ascending order.
    pub const ALL: [Self; 3] = [Self::Free, Self::Core, Self::Shield];

    /// Returns the persisted tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Core => "core",
            Self::Shield => "shield",
        }
    }
}

impl FromStr for SubscriptionTier {
    type Err = TierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "core" => Ok(Self::Core),
            "shield" => Ok(Self::Shield),
            other => Err(TierError::Unrecognized(other.to_string())),
        }
    }
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored tier tag that is not one of the known tiers.
///
/// Never mapped to a fallback tier: an unknown tag is a broken contract
/// between the writer and the reader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierError {
    /// The tag is not `free`, `core` or `shield`.
    #[error("unrecognized subscription tier: '{0}'")]
    Unrecognized(String),
}

impl ErrorCode for TierError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unrecognized(_) => "TIER_UNRECOGNIZED",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}
