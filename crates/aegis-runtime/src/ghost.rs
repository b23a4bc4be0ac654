//! Per-tab ghost mode flag.

use crate::storage::{SharedStore, GHOST_MODE_KEY};
use tracing::{debug, warn};

/// A boolean persisted in tab-scoped storage as `"true"`/`"false"`.
///
/// Unreadable storage reads as disabled.
///
/// # Example
///
/// ```
/// use aegis_runtime::storage::{MemoryStore, SharedStore};
/// use aegis_runtime::GhostMode;
/// use std::sync::Arc;
///
/// let tab_store: SharedStore = Arc::new(MemoryStore::new());
/// let ghost = GhostMode::new(tab_store);
///
/// assert!(!ghost.is_enabled());
/// assert!(ghost.toggle());
/// ghost.reset();
/// assert!(!ghost.is_enabled());
/// ```
#[derive(Debug, Clone)]
pub struct GhostMode {
    store: SharedStore,
}

impl GhostMode {
    /// Creates the flag over a tab-scoped store.
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Returns the current state.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        match self.store.get(GHOST_MODE_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                warn!(error = %e, "Ghost mode flag unreadable");
                false
            }
        }
    }

    /// Sets the flag.
    pub fn set(&self, enabled: bool) {
        let value = if enabled { "true" } else { "false" };
        match self.store.set(GHOST_MODE_KEY, value) {
            Ok(()) => debug!(enabled, "Ghost mode set"),
            Err(e) => warn!(error = %e, "Failed to persist ghost mode"),
        }
    }

    /// Flips the flag and returns the new state.
    pub fn toggle(&self) -> bool {
        let enabled = !self.is_enabled();
        self.set(enabled);
        enabled
    }

    /// Removes the flag, returning to disabled.
    pub fn reset(&self) {
        if let Err(e) = self.store.remove(GHOST_MODE_KEY) {
            warn!(error = %e, "Failed to reset ghost mode");
        }
    }
}
