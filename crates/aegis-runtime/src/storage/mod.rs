//! Durable key/value storage.
//!
//! Every persisted Aegis record lives behind the [`KeyValueStore`] trait,
//! the Rust counterpart of per-origin browser storage:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  UserRegistry / SessionStore / TierStore / GhostMode      │
//! └───────────────────────────────────────────────────────────┘
//!                          │ JsonSlot<T> / raw tags
//!                          ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │  KeyValueStore trait                                      │
//! └───────────────────────────────────────────────────────────┘
//!          │                   │                    │
//!          ▼                   ▼                    ▼
//!   ┌────────────┐      ┌────────────┐      ┌──────────────┐
//!   │ MemoryStore│      │ FileStore  │      │ DisabledStore│
//!   └────────────┘      └────────────┘      └──────────────┘
//! ```
//!
//! Writes are whole-value overwrites. There is no partial update and no
//! cross-writer transaction: the last completed write wins.

mod disabled;
mod error;
mod file;
mod memory;
mod slot;

pub use disabled::DisabledStore;
pub use error::StorageError;
pub use file::{default_storage_path, FileStore};
pub use memory::MemoryStore;
pub use slot::JsonSlot;

use std::sync::Arc;

/// Key of the registry table.
pub const USERS_KEY: &str = "aegis.users";

/// Key of the current-session record.
pub const SESSION_KEY: &str = "aegis.session";

/// Prefix of per-identity tier tags (`aegis.tier.<email>`).
pub const TIER_KEY_PREFIX: &str = "aegis.tier.";

/// Key of the tab-scoped ghost-mode flag.
pub const GHOST_MODE_KEY: &str = "aegis.ghost_mode";

/// Synchronous string key/value storage.
///
/// Implementations must be `Send + Sync`; every call is atomic with
/// respect to other calls on the same store.
///
/// # Example
///
/// ```
/// use aegis_runtime::storage::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.set("k", "v").unwrap();
/// assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
/// store.remove("k").unwrap();
/// assert_eq!(store.get("k").unwrap(), None);
/// ```
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Returns the value under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrites the value under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Shared handle to a store.
pub type SharedStore = Arc<dyn KeyValueStore>;
