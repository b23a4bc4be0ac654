//! Per-identity subscription tier storage.
//!
//! Each identity's tier is a bare tag (`free`, `core` or `shield`) under
//! `aegis.tier.<email>`, independent of the session record. The tag is
//! re-read on every query; nothing is cached here.

use crate::storage::{SharedStore, StorageError, TIER_KEY_PREFIX};
use aegis_auth::{resolve, Entitlement};
use aegis_types::{Email, ErrorCode, SubscriptionTier, TierError};
use thiserror::Error;
use tracing::info;

/// Failure to determine an identity's tier.
#[derive(Debug, Error)]
pub enum TierStoreError {
    /// The store could not be read.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A tag is stored but is not a known tier.
    #[error("stored tier for {identity} is corrupt: {source}")]
    Corrupt {
        identity: Email,
        #[source]
        source: TierError,
    },
}

impl ErrorCode for TierStoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::Storage(e) => e.code(),
            Self::Corrupt { source, .. } => source.code(),
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_recoverable(),
            Self::Corrupt { .. } => false,
        }
    }
}

/// Reads and overwrites per-identity tiers.
///
/// # Example
///
/// ```
/// use aegis_runtime::storage::{MemoryStore, SharedStore};
/// use aegis_runtime::TierStore;
/// use aegis_types::{Email, SubscriptionTier};
/// use std::sync::Arc;
///
/// let store: SharedStore = Arc::new(MemoryStore::new());
/// let tiers = TierStore::new(store);
/// let ana = Email::new("ana@x.com");
///
/// assert_eq!(tiers.tier_of(&ana).unwrap(), SubscriptionTier::Free);
/// tiers.set_tier(&ana, SubscriptionTier::Core).unwrap();
/// assert!(tiers.entitlements_of(&ana).unwrap().neural_lab());
/// ```
#[derive(Debug, Clone)]
pub struct TierStore {
    store: SharedStore,
}

impl TierStore {
    /// Creates a tier store over `store`.
    ///
    /// Pass a [`DurableStorage`](crate::DurableStorage) handle so that
    /// [`set_tier`](Self::set_tier) notifies other tabs.
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Returns the storage key for `identity`.
    #[must_use]
    pub fn key_for(identity: &Email) -> String {
        format!("{TIER_KEY_PREFIX}{identity}")
    }

    /// Returns the tier of `identity`; an identity with no stored tag is
    /// on [`SubscriptionTier::Free`].
    ///
    /// # Errors
    ///
    /// - [`TierStoreError::Storage`] if the store fails
    /// - [`TierStoreError::Corrupt`] if the stored tag is unrecognized
    pub fn tier_of(&self, identity: &Email) -> Result<SubscriptionTier, TierStoreError> {
        match self.store.get(&Self::key_for(identity))? {
            None => Ok(SubscriptionTier::Free),
            Some(tag) => tag
                .trim()
                .parse()
                .map_err(|source| TierStoreError::Corrupt {
                    identity: identity.clone(),
                    source,
                }),
        }
    }

    /// Returns the capability set of `identity`'s current tier.
    ///
    /// # Errors
    ///
    /// Same as [`tier_of`](Self::tier_of).
    pub fn entitlements_of(&self, identity: &Email) -> Result<Entitlement, TierStoreError> {
        self.tier_of(identity).map(resolve)
    }

    /// Overwrites `identity`'s tier.
    ///
    /// Immediately visible to [`tier_of`](Self::tier_of) in every context;
    /// other tabs are notified through the store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub fn set_tier(&self, identity: &Email, tier: SubscriptionTier) -> Result<(), StorageError> {
        self.store.set(&Self::key_for(identity), tier.as_str())?;
        info!(identity = %identity, tier = %tier, "Subscription tier changed");
        Ok(())
    }
}
