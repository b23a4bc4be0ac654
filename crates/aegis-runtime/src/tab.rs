//! One open view of the application.
//!
//! A [`Tab`] wires the stores together the way a browser tab sees them:
//! registry, session and tiers in origin-durable storage (shared with every
//! other tab), ghost mode in tab-scoped storage, telemetry in memory.

use crate::auth::AuthService;
use crate::config::AegisConfig;
use crate::gate::{GateRoutes, RouteGate};
use crate::ghost::GhostMode;
use crate::hotkey::{HotkeyDispatcher, HotkeyError, HotkeyGuard, KeyCombo};
use crate::origin::{DurableStorage, StorageSignals};
use crate::registry::UserRegistry;
use crate::session::SessionStore;
use crate::storage::{MemoryStore, SharedStore};
use crate::sync::{AccessSource, SyncBridge};
use crate::telemetry::TelemetryLog;
use crate::tier::{TierStore, TierStoreError};
use aegis_auth::{resolve, AccessDenied, AccessRequirement, AuthError, Entitlement};
use aegis_types::{SubscriptionTier, TabId};
use std::sync::Arc;
use tracing::{debug, warn};

/// A tab opened on an [`Origin`](crate::Origin).
///
/// # Example
///
/// ```
/// use aegis_runtime::Origin;
///
/// let origin = Origin::in_memory();
/// let tab = origin.open_tab();
///
/// tab.registry().register("Ana", "ana@x.com", "secret1").unwrap();
/// assert!(!tab.is_authenticated());
/// assert_eq!(tab.current_tier().unwrap(), None);
/// ```
#[derive(Debug)]
pub struct Tab {
    id: TabId,
    durable: DurableStorage,
    config: Arc<AegisConfig>,
    registry: UserRegistry,
    sessions: SessionStore,
    tiers: TierStore,
    telemetry: TelemetryLog,
    ghost_mode: GhostMode,
    auth: AuthService,
}

impl Tab {
    /// Builds a tab over `durable` storage.
    #[must_use]
    pub fn open(durable: DurableStorage, config: Arc<AegisConfig>) -> Self {
        let id = durable.tab();
        let shared: SharedStore = Arc::new(durable.clone());
        let tab_scoped: SharedStore = Arc::new(MemoryStore::new());

        let registry = UserRegistry::new(Arc::clone(&shared));
        let sessions = SessionStore::new(Arc::clone(&shared));
        let tiers = TierStore::new(shared);
        let telemetry = TelemetryLog::with_capacity(config.telemetry.capacity());
        let ghost_mode = GhostMode::new(tab_scoped);
        let auth = AuthService::new(
            registry.clone(),
            sessions.clone(),
            telemetry.clone(),
            ghost_mode.clone(),
            config.latency.clone(),
        );

        debug!(tab = %id, "Tab opened");
        Self {
            id,
            durable,
            config,
            registry,
            sessions,
            tiers,
            telemetry,
            ghost_mode,
            auth,
        }
    }

    #[must_use]
    pub fn id(&self) -> TabId {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &AegisConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &UserRegistry {
        &self.registry
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[must_use]
    pub fn tiers(&self) -> &TierStore {
        &self.tiers
    }

    #[must_use]
    pub fn telemetry(&self) -> &TelemetryLog {
        &self.telemetry
    }

    #[must_use]
    pub fn ghost_mode(&self) -> &GhostMode {
        &self.ghost_mode
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Subscribes to durable-storage changes made by other tabs.
    #[must_use]
    pub fn signals(&self) -> StorageSignals {
        self.durable.subscribe()
    }

    /// Returns `true` iff a session exists.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.sessions.is_authenticated()
    }

    /// Tier of the signed-in identity, or `None` when signed out.
    ///
    /// # Errors
    ///
    /// Returns [`TierStoreError`] if the stored tier cannot be read.
    pub fn current_tier(&self) -> Result<Option<SubscriptionTier>, TierStoreError> {
        match self.sessions.current_session() {
            Some(session) => self.tiers.tier_of(&session.email).map(Some),
            None => Ok(None),
        }
    }

    /// Capabilities of the signed-in identity; empty when signed out.
    ///
    /// # Errors
    ///
    /// Returns [`TierStoreError`] if the stored tier cannot be read.
    pub fn current_entitlements(&self) -> Result<Entitlement, TierStoreError> {
        Ok(self
            .current_tier()?
            .map_or(Entitlement::empty(), resolve))
    }

    /// Overwrites the signed-in identity's tier.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InsufficientRole`] with [`AccessDenied::NotAuthenticated`]
    ///   when nobody is signed in
    /// - [`AuthError::StorageUnavailable`] if the write fails
    pub fn set_current_tier(&self, tier: SubscriptionTier) -> Result<(), AuthError> {
        let session = self
            .sessions
            .current_session()
            .ok_or(AccessDenied::NotAuthenticated)?;
        self.tiers.set_tier(&session.email, tier)?;
        Ok(())
    }

    /// Reader used by the sync bridge.
    #[must_use]
    pub fn access_source(&self) -> AccessSource {
        AccessSource::new(self.sessions.clone(), self.tiers.clone())
    }

    /// Starts this tab's sync bridge. Requires a tokio runtime.
    #[must_use]
    pub fn spawn_sync(&self) -> SyncBridge {
        SyncBridge::spawn(
            self.access_source(),
            self.signals(),
            self.config.sync.poll_interval(),
        )
    }

    /// Mounts a gate using the configured redirect routes.
    #[must_use]
    pub fn gate(&self, name: impl Into<String>, requirement: AccessRequirement) -> RouteGate {
        RouteGate::new(name, requirement, GateRoutes::from(&self.config.gate))
    }

    /// Binds the configured panic combo to sign-out.
    ///
    /// # Errors
    ///
    /// Returns [`HotkeyError`] if the configured combo does not parse.
    pub fn bind_panic_hotkey(
        &self,
        dispatcher: &HotkeyDispatcher,
    ) -> Result<HotkeyGuard, HotkeyError> {
        let combo: KeyCombo = self.config.hotkeys.panic.parse()?;
        let auth = self.auth.clone();
        let tab = self.id;
        Ok(dispatcher.register(combo, move || {
            warn!(tab = %tab, "Panic hotkey pressed");
            auth.sign_out();
        }))
    }
}
