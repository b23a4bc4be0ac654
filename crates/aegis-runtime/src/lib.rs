//! Aegis runtime: local identity, sessions and entitlements.
//!
//! # Overview
//!
//! ```text
//!                       ┌──────────────── Origin ────────────────┐
//!                       │  KeyValueStore   broadcast<StorageSignal>
//!                       └────────┬──────────────────┬────────────┘
//!                                │                  │
//!   Tab ─────────────────────────┼──────────────────┼──────────────
//!   │ UserRegistry   (aegis.users)                  │
//!   │ SessionStore   (aegis.session)                │
//!   │ TierStore      (aegis.tier.<email>)           │
//!   │ AuthService    sign_up / sign_in / sign_out   │
//!   │ SyncBridge ◄── signals from other tabs ───────┘ + polling
//!   │     └──► watch::Receiver<AccessSnapshot> ──► RouteGate
//!   │ GhostMode      (tab-scoped storage)
//!   │ TelemetryLog   (memory)
//!   └──────────────────────────────────────────────────────────────
//! ```
//!
//! # Example
//!
//! ```
//! use aegis_auth::{AccessRequirement, Entitlement};
//! use aegis_runtime::config::AegisConfig;
//! use aegis_runtime::storage::MemoryStore;
//! use aegis_runtime::Origin;
//! use aegis_types::SubscriptionTier;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let mut config = AegisConfig::default();
//! config.latency.enabled = false;
//! let origin = Origin::new(Arc::new(MemoryStore::new()), config);
//! let tab = origin.open_tab();
//!
//! tab.auth().sign_up("Ana", "ana@x.com", "secret1").await.unwrap();
//! tab.auth().sign_in("ana@x.com", "secret1").await.unwrap();
//!
//! let mut lab = tab.gate("neural-lab", AccessRequirement::feature(Entitlement::NEURAL_LAB));
//! assert!(!lab.evaluate(&tab.access_source().read()).await.is_granted());
//!
//! tab.set_current_tier(SubscriptionTier::Core).unwrap();
//! assert!(lab.evaluate(&tab.access_source().read()).await.is_granted());
//! # });
//! ```
//!
//! # Not a security boundary
//!
//! Passwords are stored and compared in plain form, and any code on the
//! origin can read or rewrite every record.

pub mod auth;
pub mod config;
pub mod gate;
pub mod ghost;
pub mod hotkey;
pub mod logging;
pub mod origin;
pub mod registry;
pub mod session;
pub mod storage;
pub mod sync;
pub mod tab;
pub mod telemetry;
pub mod tier;

pub use auth::{AuthService, SignUpForm, ValidationError};
pub use config::{AegisConfig, ConfigError, ConfigLoader};
pub use gate::{GateNotice, GateRoutes, GateState, RouteGate};
pub use ghost::GhostMode;
pub use hotkey::{HotkeyDispatcher, HotkeyError, HotkeyGuard, KeyCombo, KeyEvent, Modifiers};
pub use origin::{DurableStorage, Origin, StorageSignal, StorageSignals};
pub use registry::UserRegistry;
pub use session::SessionStore;
pub use storage::{KeyValueStore, StorageError};
pub use sync::{AccessSnapshot, AccessSource, SyncBridge, TierView};
pub use tab::Tab;
pub use telemetry::{TelemetryEvent, TelemetryKind, TelemetryLog};
pub use tier::{TierStore, TierStoreError};
