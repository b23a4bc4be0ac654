//! Store for hosts that block persistent storage.

use super::{KeyValueStore, StorageError};

/// A store that refuses every operation.
///
/// Models a host where storage is blocked (private mode, policy). Layers
/// above must degrade to "unauthenticated" instead of failing.
#[derive(Debug, Clone, Default)]
pub struct DisabledStore;

impl DisabledStore {
    const REASON: &'static str = "persistent storage is disabled by the host";
}

impl KeyValueStore for DisabledStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::unavailable(Self::REASON))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::unavailable(Self::REASON))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::unavailable(Self::REASON))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_operation_is_unavailable() {
        let store = DisabledStore;
        assert!(matches!(store.get("k"), Err(StorageError::Unavailable(_))));
        assert!(matches!(store.set("k", "v"), Err(StorageError::Unavailable(_))));
        assert!(matches!(store.remove("k"), Err(StorageError::Unavailable(_))));
    }
}
