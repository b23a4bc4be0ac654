//! Entitlement and access primitives for Aegis.
//!
//! # Access Model
//!
//! ```text
//! Access = Session(WHO) ∩ Role(AT LEAST) ∩ Tier(AT LEAST) ∩ Entitlement(WHAT)
//! ```
//!
//! | Layer | Type | Controls |
//! |-------|------|----------|
//! | [`SessionRecord`] | Struct | Who is signed in (presence = authenticated) |
//! | [`Role`] | Enum | Minimum account role |
//! | [`SubscriptionTier`] | Enum | Minimum subscription tier |
//! | [`Entitlement`] | Bitflags | Which features the tier unlocks |
//!
//! # Crate Architecture
//!
//! ```text
//! aegis-types  (Email, Role, SubscriptionTier)
//!     ↑
//! aegis-auth   (records, Entitlement, AccessRequirement, RoleService)  ◄── THIS CRATE
//!     ↑
//! aegis-runtime (storage-backed registry, sessions, tiers, gate)
//! ```
//!
//! # Design Principles
//!
//! - **Pure decisions here, storage in the runtime**: nothing in this crate
//!   touches storage or clocks
//! - **Deny wins**: every layer must allow for access to be granted

pub mod entitlement;
pub mod error;
pub mod record;
pub mod requirement;
pub mod role_service;

pub use entitlement::{resolve, Entitlement};
pub use error::{AccessDenied, AuthError};
pub use record::{SessionRecord, UserRecord};
pub use requirement::AccessRequirement;
pub use role_service::{RoleService, RoleServiceError};

pub use aegis_types::{Email, Role, SubscriptionTier};
