//! Current-session store.
//!
//! One JSON record under [`SESSION_KEY`]. Its presence *is* the
//! authenticated state; there is no separate flag to drift out of sync.

use crate::storage::{JsonSlot, SharedStore, StorageError, SESSION_KEY};
use aegis_auth::{AuthError, SessionRecord, UserRecord};
use tracing::{debug, info, warn};

/// Single-slot store for the current session.
///
/// # Example
///
/// ```
/// use aegis_auth::UserRecord;
/// use aegis_runtime::storage::{MemoryStore, SharedStore};
/// use aegis_runtime::SessionStore;
/// use std::sync::Arc;
///
/// let store: SharedStore = Arc::new(MemoryStore::new());
/// let sessions = SessionStore::new(store);
///
/// sessions.start_session(&UserRecord::new("Ana", "ana@x.com", "p")).unwrap();
/// assert!(sessions.is_authenticated());
///
/// sessions.end_session();
/// sessions.end_session();
/// assert!(sessions.current_session().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct SessionStore {
    slot: JsonSlot<SessionRecord>,
}

impl SessionStore {
    /// Creates a session store over `store`.
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self {
            slot: JsonSlot::new(store, SESSION_KEY),
        }
    }

    /// Persists a session projected from `user`, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::StorageUnavailable`] if the record cannot be written.
    pub fn start_session(&self, user: &UserRecord) -> Result<SessionRecord, AuthError> {
        let session = SessionRecord::from_user(user);
        self.slot.write(&session)?;
        info!(email = %session.email, role = %session.role, "Session started");
        Ok(session)
    }

    /// Reads the current session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage fails or the record is malformed.
    pub fn try_current_session(&self) -> Result<Option<SessionRecord>, StorageError> {
        self.slot.read()
    }

    /// Returns the current session, or `None` when signed out.
    ///
    /// Unreadable or malformed storage also yields `None`: the caller is
    /// then simply unauthenticated.
    #[must_use]
    pub fn current_session(&self) -> Option<SessionRecord> {
        self.try_current_session().unwrap_or_else(|e| {
            warn!(error = %e, "Session unreadable, treating as signed out");
            None
        })
    }

    /// Returns `true` iff a session record exists.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current_session().is_some()
    }

    /// Removes the session record.
    ///
    /// Idempotent. Does not touch tiers or the registry; per-tab state is
    /// reset by [`AuthService::sign_out`](crate::auth::AuthService::sign_out).
    pub fn end_session(&self) {
        match self.slot.clear() {
            Ok(()) => debug!("Session ended"),
            Err(e) => warn!(error = %e, "Failed to remove session record"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DisabledStore, KeyValueStore, MemoryStore};
    use aegis_types::Role;
    use std::sync::Arc;

    fn sessions() -> (SessionStore, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (SessionStore::new(store.clone()), store)
    }

    fn ana() -> UserRecord {
        UserRecord::new("Ana", "ana@x.com", "secret1")
    }

    #[test]
    fn starts_signed_out() {
        let (sessions, _) = sessions();
        assert!(sessions.current_session().is_none());
        assert!(!sessions.is_authenticated());
    }

    #[test]
    fn start_session_projects_user() {
        let (sessions, _) = sessions();
        let started = sessions.start_session(&ana()).unwrap();
        let current = sessions.current_session().unwrap();
        assert_eq!(started, current);
        assert_eq!(current.role, Role::User);
        assert_eq!(current.email.as_str(), "ana@x.com");
    }

    #[test]
    fn start_session_overwrites_never_merges() {
        let (sessions, _) = sessions();
        sessions.start_session(&ana()).unwrap();

        let mut bob = UserRecord::new("Bob", "bob@x.com", "pw");
        bob.role = Role::Admin;
        sessions.start_session(&bob).unwrap();

        let current = sessions.current_session().unwrap();
        assert_eq!(current.name, "Bob");
        assert_eq!(current.role, Role::Admin);
        assert_eq!(current.email.as_str(), "bob@x.com");
    }

    #[test]
    fn end_session_twice_is_noop() {
        let (sessions, _) = sessions();
        sessions.start_session(&ana()).unwrap();
        sessions.end_session();
        sessions.end_session();
        assert!(!sessions.is_authenticated());
    }

    #[test]
    fn authenticated_iff_record_present() {
        let (sessions, store) = sessions();
        assert_eq!(sessions.is_authenticated(), sessions.current_session().is_some());

        sessions.start_session(&ana()).unwrap();
        assert_eq!(sessions.is_authenticated(), sessions.current_session().is_some());

        store.remove(SESSION_KEY).unwrap();
        assert!(!sessions.is_authenticated());
    }

    #[test]
    fn malformed_record_is_signed_out() {
        let (sessions, store) = sessions();
        store.set(SESSION_KEY, "{\"name\":").unwrap();
        assert!(sessions.current_session().is_none());
        assert!(sessions.try_current_session().is_err());
    }

    #[test]
    fn disabled_storage_is_always_signed_out() {
        let sessions = SessionStore::new(Arc::new(DisabledStore));
        assert!(matches!(
            sessions.start_session(&ana()),
            Err(AuthError::StorageUnavailable(_))
        ));
        assert!(!sessions.is_authenticated());
        sessions.end_session();
    }
}
