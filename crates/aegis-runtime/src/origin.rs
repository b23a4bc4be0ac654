//! Origin-shared storage and cross-tab change signals.
//!
//! An [`Origin`] is everything tabs of the same application share: one
//! durable store and one "storage changed" broadcast. Each tab writes
//! through its own [`DurableStorage`] handle, which tags every change with
//! the writer's [`TabId`].
//!
//! ```text
//!            ┌──────────────── Origin ────────────────┐
//!            │  SharedStore      broadcast<StorageSignal>
//!            └──────┬───────────────────┬─────────────┘
//!                   │                   │
//!        DurableStorage(tab A)   DurableStorage(tab B)
//!          set() ──► store ──► signal{source: A} ──► tab B only
//! ```
//!
//! Like browser storage events, a signal is never delivered back to the
//! tab that caused it, and it carries no value: receivers re-read.

use crate::config::{AegisConfig, StorageBackend};
use crate::storage::{
    DisabledStore, FileStore, KeyValueStore, MemoryStore, SharedStore, StorageError,
};
use crate::tab::Tab;
use aegis_types::TabId;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

/// Capacity of the cross-tab signal channel.
const SIGNAL_CAPACITY: usize = 64;

/// "Something changed in durable storage."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSignal {
    /// Key that changed, or `None` if signals were missed.
    pub key: Option<String>,
    /// Tab that wrote, or `None` if signals were missed.
    pub source: Option<TabId>,
}

impl StorageSignal {
    fn missed() -> Self {
        Self {
            key: None,
            source: None,
        }
    }
}

/// Storage and signals shared by every tab of one application origin.
///
/// Cheap to clone; clones share the same store and broadcast.
///
/// # Example
///
/// ```
/// use aegis_runtime::Origin;
///
/// let origin = Origin::in_memory();
/// let tab_a = origin.open_tab();
/// let tab_b = origin.open_tab();
/// assert_ne!(tab_a.id(), tab_b.id());
/// ```
#[derive(Debug, Clone)]
pub struct Origin {
    store: SharedStore,
    signals: broadcast::Sender<StorageSignal>,
    config: Arc<AegisConfig>,
}

impl Origin {
    /// Creates an origin over `store` with `config`.
    #[must_use]
    pub fn new(store: SharedStore, config: AegisConfig) -> Self {
        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self {
            store,
            signals,
            config: Arc::new(config),
        }
    }

    /// Creates an in-memory origin with default configuration.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), AegisConfig::default())
    }

    /// Creates an origin with the storage backend named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a file-backed store cannot be created.
    pub fn from_config(config: AegisConfig) -> Result<Self, StorageError> {
        let store: SharedStore = match config.storage.backend {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::File => Arc::new(FileStore::new(config.storage.resolved_dir())?),
            StorageBackend::Disabled => Arc::new(DisabledStore),
        };
        debug!(backend = ?config.storage.backend, "Opened origin storage");
        Ok(Self::new(store, config))
    }

    /// Returns the configuration shared by all tabs.
    #[must_use]
    pub fn config(&self) -> &AegisConfig {
        &self.config
    }

    /// Returns a storage handle whose writes are attributed to `tab`.
    #[must_use]
    pub fn durable_for(&self, tab: TabId) -> DurableStorage {
        DurableStorage {
            store: Arc::clone(&self.store),
            signals: self.signals.clone(),
            tab,
        }
    }

    /// Opens a new tab on this origin.
    #[must_use]
    pub fn open_tab(&self) -> Tab {
        Tab::open(self.durable_for(TabId::new()), Arc::clone(&self.config))
    }
}

/// A tab's view of origin storage.
///
/// Reads go straight to the shared store. Successful writes and removals
/// broadcast a [`StorageSignal`] to every other tab.
#[derive(Debug, Clone)]
pub struct DurableStorage {
    store: SharedStore,
    signals: broadcast::Sender<StorageSignal>,
    tab: TabId,
}

impl DurableStorage {
    /// Returns the tab this handle writes for.
    #[must_use]
    pub fn tab(&self) -> TabId {
        self.tab
    }

    /// Subscribes to changes made by other tabs.
    #[must_use]
    pub fn subscribe(&self) -> StorageSignals {
        StorageSignals {
            rx: self.signals.subscribe(),
            tab: self.tab,
        }
    }

    fn notify(&self, key: &str) {
        // No receivers is fine: no other tab is listening.
        let _ = self.signals.send(StorageSignal {
            key: Some(key.to_string()),
            source: Some(self.tab),
        });
    }
}

impl KeyValueStore for DurableStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.store.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.store.set(key, value)?;
        self.notify(key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.store.remove(key)?;
        self.notify(key);
        Ok(())
    }
}

/// Receiver of storage changes made by *other* tabs.
#[derive(Debug)]
pub struct StorageSignals {
    rx: broadcast::Receiver<StorageSignal>,
    tab: TabId,
}

impl StorageSignals {
    /// Waits for the next change from another tab.
    ///
    /// If this receiver fell behind, a signal with no key is returned; the
    /// caller re-reads either way. Returns `None` once the origin is gone.
    pub async fn changed(&mut self) -> Option<StorageSignal> {
        loop {
            match self.rx.recv().await {
                Ok(signal) if signal.source == Some(self.tab) => continue,
                Ok(signal) => return Some(signal),
                Err(RecvError::Lagged(skipped)) => {
                    debug!(tab = %self.tab, skipped, "Storage signals lagged");
                    return Some(StorageSignal::missed());
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn other_tab_receives_signal() {
        let origin = Origin::in_memory();
        let a = origin.durable_for(TabId::new());
        let b = origin.durable_for(TabId::new());
        let mut b_signals = b.subscribe();

        a.set("aegis.session", "{}").unwrap();

        let signal = tokio::time::timeout(Duration::from_secs(1), b_signals.changed())
            .await
            .expect("signal within timeout")
            .expect("origin alive");
        assert_eq!(signal.key.as_deref(), Some("aegis.session"));
        assert_eq!(signal.source, Some(a.tab()));
    }

    #[tokio::test]
    async fn writer_does_not_receive_own_signal() {
        let origin = Origin::in_memory();
        let a = origin.durable_for(TabId::new());
        let mut a_signals = a.subscribe();

        a.set("aegis.session", "{}").unwrap();

        let result = tokio::time::timeout(Duration::from_millis(100), a_signals.changed()).await;
        assert!(result.is_err(), "own write must not be signalled");
    }

    #[tokio::test]
    async fn failed_write_is_not_signalled() {
        let origin = Origin::new(Arc::new(DisabledStore), AegisConfig::default());
        let a = origin.durable_for(TabId::new());
        let mut b_signals = origin.durable_for(TabId::new()).subscribe();

        assert!(a.set("k", "v").is_err());

        let result = tokio::time::timeout(Duration::from_millis(100), b_signals.changed()).await;
        assert!(result.is_err());
    }

    #[test]
    fn tabs_share_storage() {
        let origin = Origin::in_memory();
        let a = origin.durable_for(TabId::new());
        let b = origin.durable_for(TabId::new());
        a.set("k", "v").unwrap();
        assert_eq!(b.get("k").unwrap().as_deref(), Some("v"));
    }
}
