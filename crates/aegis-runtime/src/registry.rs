//! Persistent user registry.
//!
//! A JSON array of [`UserRecord`]s under [`USERS_KEY`]. Records are only
//! ever appended by [`UserRegistry::register`]; nothing here edits or
//! deletes one. An absent table reads as empty.

use crate::storage::{JsonSlot, SharedStore, StorageError, USERS_KEY};
use aegis_auth::{AuthError, UserRecord};
use aegis_types::Email;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The durable table of registered accounts.
///
/// Cheap to clone; clones share the table and the write lock, so a
/// read-check-append in one tab is atomic with respect to that tab.
/// Concurrent registration from two tabs is last-write-wins.
///
/// # Example
///
/// ```
/// use aegis_runtime::storage::{MemoryStore, SharedStore};
/// use aegis_runtime::UserRegistry;
/// use std::sync::Arc;
///
/// let store: SharedStore = Arc::new(MemoryStore::new());
/// let registry = UserRegistry::new(store);
///
/// registry.register("Ana", "ana@x.com", "secret1").unwrap();
/// assert!(registry.register("Ana2", "ANA@X.COM", "other").is_err());
/// assert!(registry.authenticate("ana@x.com", "secret1").is_some());
/// assert!(registry.authenticate("ana@x.com", "wrong").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct UserRegistry {
    table: JsonSlot<Vec<UserRecord>>,
    write_lock: Arc<Mutex<()>>,
}

impl UserRegistry {
    /// Creates a registry over `store`.
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self {
            table: JsonSlot::new(store, USERS_KEY),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Writes an empty table if none exists.
    ///
    /// Optional: every operation already treats an absent table as empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store fails.
    pub fn init(&self) -> Result<(), StorageError> {
        self.table.init().map(|_| ())
    }

    /// Returns every registered record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store fails or the table is malformed.
    pub fn users(&self) -> Result<Vec<UserRecord>, StorageError> {
        Ok(self.table.read()?.unwrap_or_default())
    }

    /// Returns `true` if an account exists for `email` (any case).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the table cannot be read.
    pub fn contains(&self, email: &str) -> Result<bool, StorageError> {
        let email = Email::new(email);
        Ok(self.users()?.iter().any(|u| u.email == email))
    }

    /// Registers a new account with [`Role::User`](aegis_types::Role::User).
    ///
    /// Performs no password-strength validation; see
    /// [`SignUpForm`](crate::auth::SignUpForm) for the form-level checks.
    ///
    /// # Errors
    ///
    /// - [`AuthError::DuplicateEmail`] if the normalized email is taken
    /// - [`AuthError::StorageUnavailable`] if the table cannot be read or written
    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<(), AuthError> {
        let record = UserRecord::new(name, email, password);

        let _guard = self.write_lock.lock();
        let mut users = self.users()?;

        if users.iter().any(|u| u.email == record.email) {
            debug!(email = %record.email, "Registration rejected: duplicate email");
            return Err(AuthError::duplicate_email(record.email));
        }

        info!(email = %record.email, "Registered account");
        users.push(record);
        self.table.write(&users)?;
        Ok(())
    }

    /// Looks up the first record matching `email` (normalized) and
    /// `password` (exact).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the table cannot be read.
    pub fn try_authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, StorageError> {
        let email = Email::new(email);
        Ok(self
            .users()?
            .into_iter()
            .find(|u| u.matches(&email, password)))
    }

    /// Like [`try_authenticate`](Self::try_authenticate), but an unreadable
    /// table counts as "no match".
    #[must_use]
    pub fn authenticate(&self, email: &str, password: &str) -> Option<UserRecord> {
        self.try_authenticate(email, password)
            .unwrap_or_else(|e| {
                warn!(error = %e, "Registry unreadable, treating as no match");
                None
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DisabledStore, KeyValueStore, MemoryStore};
    use aegis_types::Role;

    fn registry() -> (UserRegistry, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (UserRegistry::new(store.clone()), store)
    }

    #[test]
    fn uninitialized_table_is_empty() {
        let (registry, _) = registry();
        assert!(registry.users().unwrap().is_empty());
        assert!(registry.authenticate("ana@x.com", "secret1").is_none());
    }

    #[test]
    fn register_then_authenticate() {
        let (registry, _) = registry();
        registry.register("Ana", "ana@x.com", "secret1").unwrap();

        let user = registry.authenticate("ana@x.com", "secret1").unwrap();
        assert_eq!(user.name, "Ana");
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn duplicate_email_any_case_keeps_one_record() {
        let (registry, _) = registry();
        registry.register("Ana", "ana@x.com", "secret1").unwrap();

        let err = registry.register("Ana2", "ANA@X.COM", "other").unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail { .. }));

        let users = registry.users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Ana");
    }

    #[test]
    fn authenticate_matches_case_variants() {
        let (registry, _) = registry();
        registry.register("Ana", "Ana@X.com", "secret1").unwrap();
        assert!(registry.authenticate("ANA@x.COM", "secret1").is_some());
    }

    #[test]
    fn password_compare_is_exact() {
        let (registry, _) = registry();
        registry.register("Ana", "ana@x.com", "secret1").unwrap();
        assert!(registry.authenticate("ana@x.com", "Secret1").is_none());
        assert!(registry.authenticate("ana@x.com", "secret1 ").is_none());
    }

    #[test]
    fn records_are_persisted_normalized() {
        let (registry, store) = registry();
        registry.register("Ana", "ANA@X.COM", "secret1").unwrap();
        let raw = store.get(USERS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"email\":\"ana@x.com\""), "got: {raw}");
        assert!(raw.contains("\"role\":\"USER\""), "got: {raw}");
    }

    #[test]
    fn init_seeds_empty_table() {
        let (registry, store) = registry();
        registry.init().unwrap();
        assert_eq!(store.get(USERS_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn contains_is_case_insensitive() {
        let (registry, _) = registry();
        registry.register("Ana", "ana@x.com", "secret1").unwrap();
        assert!(registry.contains("ANA@x.com").unwrap());
        assert!(!registry.contains("bob@x.com").unwrap());
    }

    #[test]
    fn disabled_storage_degrades() {
        let registry = UserRegistry::new(Arc::new(DisabledStore));
        assert!(matches!(
            registry.register("Ana", "ana@x.com", "secret1"),
            Err(AuthError::StorageUnavailable(_))
        ));
        assert!(registry.authenticate("ana@x.com", "secret1").is_none());
    }

    #[test]
    fn corrupt_table_blocks_registration() {
        let (registry, store) = registry();
        store.set(USERS_KEY, "not json").unwrap();
        assert!(matches!(
            registry.register("Ana", "ana@x.com", "secret1"),
            Err(AuthError::StorageUnavailable(_))
        ));
    }
}
