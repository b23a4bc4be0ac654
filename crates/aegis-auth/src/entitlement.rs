//! Tier-derived feature entitlements.
//!
//! The capability table is a single exhaustive `match` in [`resolve`]:
//!
//! | tier | NEURAL_LAB | SENTINEL_PROTOCOL | LIVE_SPECTRAL_ANALYSIS |
//! |------|------------|-------------------|------------------------|
//! | free | - | - | - |
//! | core | ✓ | - | - |
//! | shield | ✓ | ✓ | ✓ |
//!
//! Every flag is monotonic in tier order: if a tier grants it, all higher
//! tiers grant it too.
//!
//! # Example
//!
//! ```
//! use aegis_auth::{resolve, Entitlement, SubscriptionTier};
//!
//! let core = resolve(SubscriptionTier::Core);
//! assert!(core.neural_lab());
//! assert!(!core.sentinel_protocol());
//!
//! let shield = resolve(SubscriptionTier::Shield);
//! assert!(shield.contains(core));
//! assert_eq!(shield, Entitlement::ALL);
//! ```

use aegis_types::SubscriptionTier;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Feature flags unlocked by a subscription tier.
    ///
    /// | Flag | Feature |
    /// |------|---------|
    /// | [`NEURAL_LAB`](Self::NEURAL_LAB) | Neural lab workspace |
    /// | [`SENTINEL_PROTOCOL`](Self::SENTINEL_PROTOCOL) | Sentinel protocol controls |
    /// | [`LIVE_SPECTRAL_ANALYSIS`](Self::LIVE_SPECTRAL_ANALYSIS) | Live spectral analysis view |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Entitlement: u8 {
        /// Neural lab workspace.
        const NEURAL_LAB             = 0b0000_0001;
        /// Sentinel protocol controls.
        const SENTINEL_PROTOCOL      = 0b0000_0010;
        /// Live spectral analysis view.
        const LIVE_SPECTRAL_ANALYSIS = 0b0000_0100;
    }
}

impl Entitlement {
    /// Every feature.
    pub const ALL: Self = Self::NEURAL_LAB
        .union(Self::SENTINEL_PROTOCOL)
        .union(Self::LIVE_SPECTRAL_ANALYSIS);

    /// Returns `true` if the neural lab is unlocked.
    #[must_use]
    pub fn neural_lab(self) -> bool {
        self.contains(Self::NEURAL_LAB)
    }

    /// Returns `true` if the sentinel protocol is unlocked.
    #[must_use]
    pub fn sentinel_protocol(self) -> bool {
        self.contains(Self::SENTINEL_PROTOCOL)
    }

    /// Returns `true` if live spectral analysis is unlocked.
    #[must_use]
    pub fn live_spectral_analysis(self) -> bool {
        self.contains(Self::LIVE_SPECTRAL_ANALYSIS)
    }

    /// Returns the lowest tier whose entitlements contain all of `self`.
    ///
    /// Used to tell a denied user which tier would unlock a feature.
    ///
    /// ```
    /// use aegis_auth::{Entitlement, SubscriptionTier};
    ///
    /// assert_eq!(Entitlement::NEURAL_LAB.minimum_tier(), SubscriptionTier::Core);
    /// assert_eq!(Entitlement::empty().minimum_tier(), SubscriptionTier::Free);
    /// ```
    #[must_use]
    pub fn minimum_tier(self) -> SubscriptionTier {
        SubscriptionTier::ALL
            .into_iter()
            .find(|tier| resolve(*tier).contains(self))
            .unwrap_or(SubscriptionTier::Shield)
    }

    /// Returns the camelCase feature names contained in this set.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.neural_lab() {
            names.push("neuralLab");
        }
        if self.sentinel_protocol() {
            names.push("sentinelProtocol");
        }
        if self.live_spectral_analysis() {
            names.push("liveSpectralAnalysis");
        }
        names
    }
}

impl std::fmt::Display for Entitlement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = self.names();
        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join(" | "))
        }
    }
}

/// Maps a subscription tier to the features it unlocks.
///
/// Pure and total. There is deliberately no wildcard arm: a new tier must
/// be given an explicit row here before the crate compiles.
#[must_use]
pub const fn resolve(tier: SubscriptionTier) -> Entitlement {
    match tier {
        SubscriptionTier::Free => Entitlement::empty(),
        SubscriptionTier::Core => Entitlement::NEURAL_LAB,
        SubscriptionTier::Shield => Entitlement::NEURAL_LAB
            .union(Entitlement::SENTINEL_PROTOCOL)
            .union(Entitlement::LIVE_SPECTRAL_ANALYSIS),
    }
}
