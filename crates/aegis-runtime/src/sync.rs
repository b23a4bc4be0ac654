//! Cross-tab sync bridge.
//!
//! Two producers feed one [`watch`] subscription:
//!
//! ```text
//!   StorageSignals (other tabs) ──┐
//!                                 ├──► re-read ──► send_if_modified ──► watch::Receiver<AccessSnapshot>
//!   interval(poll_interval) ──────┘
//! ```
//!
//! Other tabs' writes arrive as signals and are observed immediately.
//! Writes made in the same tab are never signalled, so the poll bounds
//! their staleness to one period. Observers are woken only when the
//! snapshot actually differs.

use crate::origin::{StorageSignal, StorageSignals};
use crate::session::SessionStore;
use crate::tier::TierStore;
use aegis_auth::{resolve, Entitlement, SessionRecord};
use aegis_types::SubscriptionTier;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

/// Tier as seen by the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierView {
    /// No session, so no identity to look up.
    SignedOut,
    /// The session identity's tier.
    Active(SubscriptionTier),
    /// The tier could not be determined (storage failure or corrupt tag).
    Unreadable(String),
}

/// Everything access decisions depend on, read at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessSnapshot {
    pub session: Option<SessionRecord>,
    pub tier: TierView,
}

impl AccessSnapshot {
    /// A signed-out snapshot.
    #[must_use]
    pub fn signed_out() -> Self {
        Self {
            session: None,
            tier: TierView::SignedOut,
        }
    }

    /// Returns `true` if a session is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the active tier, if readable.
    #[must_use]
    pub fn tier(&self) -> Option<SubscriptionTier> {
        match self.tier {
            TierView::Active(tier) => Some(tier),
            _ => None,
        }
    }

    /// Capabilities of the active tier; empty when signed out or unreadable.
    #[must_use]
    pub fn entitlements(&self) -> Entitlement {
        self.tier().map_or(Entitlement::empty(), resolve)
    }
}

/// Reads [`AccessSnapshot`]s from the session and tier stores.
#[derive(Debug, Clone)]
pub struct AccessSource {
    sessions: SessionStore,
    tiers: TierStore,
}

impl AccessSource {
    /// Creates a source over the given stores.
    #[must_use]
    pub fn new(sessions: SessionStore, tiers: TierStore) -> Self {
        Self { sessions, tiers }
    }

    /// Reads the current session and its identity's tier.
    #[must_use]
    pub fn read(&self) -> AccessSnapshot {
        let Some(session) = self.sessions.current_session() else {
            return AccessSnapshot::signed_out();
        };

        let tier = match self.tiers.tier_of(&session.email) {
            Ok(tier) => TierView::Active(tier),
            Err(e) => {
                debug!(email = %session.email, error = %e, "Tier unreadable");
                TierView::Unreadable(e.to_string())
            }
        };

        AccessSnapshot {
            session: Some(session),
            tier,
        }
    }
}

/// Background task keeping an [`AccessSnapshot`] current.
///
/// Must be spawned inside a tokio runtime. Dropping the bridge stops the
/// task; existing receivers then see the last published snapshot.
#[derive(Debug)]
pub struct SyncBridge {
    source: AccessSource,
    tx: Arc<watch::Sender<AccessSnapshot>>,
    rx: watch::Receiver<AccessSnapshot>,
    task: JoinHandle<()>,
}

impl SyncBridge {
    /// Reads an initial snapshot and starts listening on `signals` and
    /// polling every `poll_interval`.
    #[must_use]
    pub fn spawn(source: AccessSource, signals: StorageSignals, poll_interval: Duration) -> Self {
        let (tx, rx) = watch::channel(source.read());
        let tx = Arc::new(tx);

        let task = tokio::spawn(run(
            source.clone(),
            Arc::clone(&tx),
            signals,
            poll_interval,
        ));
        debug!(poll_ms = poll_interval.as_millis() as u64, "Sync bridge started");

        Self {
            source,
            tx,
            rx,
            task,
        }
    }

    /// Returns a new subscription. Await `changed()` on it to observe
    /// updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AccessSnapshot> {
        self.rx.clone()
    }

    /// Returns the last published snapshot.
    #[must_use]
    pub fn current(&self) -> AccessSnapshot {
        self.rx.borrow().clone()
    }

    /// Re-reads now instead of waiting for a signal or the next poll.
    ///
    /// Returns `true` if the snapshot changed.
    pub fn refresh(&self) -> bool {
        publish(&self.tx, self.source.read())
    }

    /// Returns `true` while the background task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops the background task.
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for SyncBridge {
    fn drop(&mut self) {
        self.task.abort();
    }
}

enum Wake {
    Signal(Option<StorageSignal>),
    Poll,
}

async fn run(
    source: AccessSource,
    tx: Arc<watch::Sender<AccessSnapshot>>,
    signals: StorageSignals,
    poll_interval: Duration,
) {
    let mut interval = tokio::time::interval(poll_interval.max(Duration::from_millis(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the initial read already happened.
    interval.tick().await;

    let mut signals = Some(signals);

    loop {
        let wake = tokio::select! {
            signal = next_signal(&mut signals) => Wake::Signal(signal),
            _ = interval.tick() => Wake::Poll,
        };

        match wake {
            Wake::Signal(Some(signal)) => {
                trace!(key = ?signal.key, source = ?signal.source, "Storage signal");
            }
            Wake::Signal(None) => {
                debug!("Origin closed, continuing with polling only");
                signals = None;
                continue;
            }
            Wake::Poll => {}
        }

        if publish(&tx, source.read()) {
            debug!("Access snapshot changed");
        }
    }
}

async fn next_signal(signals: &mut Option<StorageSignals>) -> Option<StorageSignal> {
    match signals {
        Some(signals) => signals.changed().await,
        None => std::future::pending().await,
    }
}

fn publish(tx: &watch::Sender<AccessSnapshot>, snapshot: AccessSnapshot) -> bool {
    tx.send_if_modified(|current| {
        if *current == snapshot {
            false
        } else {
            *current = snapshot;
            true
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::origin::Origin;
    use crate::storage::SharedStore;
    use aegis_auth::UserRecord;
    use aegis_types::{Email, TabId};

    fn source_for(origin: &Origin, tab: TabId) -> (AccessSource, StorageSignals) {
        let durable = origin.durable_for(tab);
        let signals = durable.subscribe();
        let store: SharedStore = Arc::new(durable);
        let source = AccessSource::new(SessionStore::new(store.clone()), TierStore::new(store));
        (source, signals)
    }

    fn writer(origin: &Origin) -> (SessionStore, TierStore) {
        let store: SharedStore = Arc::new(origin.durable_for(TabId::new()));
        (SessionStore::new(store.clone()), TierStore::new(store))
    }

    #[test]
    fn snapshot_entitlements() {
        let mut snapshot = AccessSnapshot::signed_out();
        assert!(snapshot.entitlements().is_empty());

        snapshot.session = Some(SessionRecord::from_user(&UserRecord::new("Ana", "ana@x.com", "p")));
        snapshot.tier = TierView::Active(SubscriptionTier::Shield);
        assert_eq!(snapshot.entitlements(), Entitlement::ALL);

        snapshot.tier = TierView::Unreadable("corrupt".into());
        assert!(snapshot.entitlements().is_empty());
        assert!(snapshot.is_authenticated());
    }

    #[tokio::test]
    async fn source_reads_session_and_tier() {
        let origin = Origin::in_memory();
        let (source, _signals) = source_for(&origin, TabId::new());
        let (sessions, tiers) = writer(&origin);

        assert_eq!(source.read(), AccessSnapshot::signed_out());

        sessions
            .start_session(&UserRecord::new("Ana", "ana@x.com", "p"))
            .unwrap();
        tiers
            .set_tier(&Email::new("ana@x.com"), SubscriptionTier::Core)
            .unwrap();

        let snapshot = source.read();
        assert_eq!(snapshot.tier, TierView::Active(SubscriptionTier::Core));
    }

    #[tokio::test]
    async fn other_tab_write_is_observed_before_poll() {
        let origin = Origin::in_memory();
        let (source, signals) = source_for(&origin, TabId::new());
        // Long poll so only the signal path can deliver in time.
        let bridge = SyncBridge::spawn(source, signals, Duration::from_secs(60));
        let mut rx = bridge.subscribe();

        let (sessions, _) = writer(&origin);
        sessions
            .start_session(&UserRecord::new("Ana", "ana@x.com", "p"))
            .unwrap();

        tokio::time::timeout(Duration::from_secs(2), rx.changed())
            .await
            .expect("update within timeout")
            .expect("bridge alive");
        assert!(rx.borrow().is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn same_tab_write_is_observed_by_poll() {
        let origin = Origin::in_memory();
        let tab = TabId::new();
        let (source, signals) = source_for(&origin, tab);
        let bridge = SyncBridge::spawn(source, signals, Duration::from_millis(500));
        let mut rx = bridge.subscribe();

        // Same tab id: no signal is delivered.
        let store: SharedStore = Arc::new(origin.durable_for(tab));
        SessionStore::new(store)
            .start_session(&UserRecord::new("Ana", "ana@x.com", "p"))
            .unwrap();

        tokio::time::timeout(Duration::from_millis(600), rx.changed())
            .await
            .expect("poll within one period")
            .expect("bridge alive");
        assert!(bridge.current().is_authenticated());
    }

    #[tokio::test]
    async fn refresh_publishes_immediately() {
        let origin = Origin::in_memory();
        let tab = TabId::new();
        let (source, signals) = source_for(&origin, tab);
        let bridge = SyncBridge::spawn(source, signals, Duration::from_secs(60));

        assert!(!bridge.refresh());

        let store: SharedStore = Arc::new(origin.durable_for(tab));
        SessionStore::new(store)
            .start_session(&UserRecord::new("Ana", "ana@x.com", "p"))
            .unwrap();

        assert!(bridge.refresh());
        assert!(bridge.current().is_authenticated());
        assert!(!bridge.refresh());
    }

    #[tokio::test]
    async fn shutdown_stops_task() {
        let origin = Origin::in_memory();
        let (source, signals) = source_for(&origin, TabId::new());
        let bridge = SyncBridge::spawn(source, signals, Duration::from_millis(10));
        assert!(bridge.is_running());

        bridge.shutdown();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!bridge.is_running());
    }
}
