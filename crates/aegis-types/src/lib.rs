//! Core types for Aegis.
//!
//! This crate holds the identity vocabulary shared by every other Aegis
//! crate. It has no storage or runtime dependencies.
//!
//! # Crate Architecture
//!
//! ```text
//! aegis-types    : Email, Role, SubscriptionTier, ids, ErrorCode  ◄── HERE
//!     ↑
//! aegis-auth     : records, Entitlement, AccessRequirement, RoleService
//!     ↑
//! aegis-runtime  : storage, registry, sessions, tiers, sync, gate, hotkeys
//! ```
//!
//! # Closed Vocabularies
//!
//! Roles and tiers are closed enums. Every consumer matches on them
//! exhaustively, so adding a variant is a compile error everywhere a
//! decision depends on it.
//!
//! # Example
//!
//! ```
//! use aegis_types::{Email, Role, SubscriptionTier};
//!
//! let email = Email::new("  Ana@X.com ");
//! assert_eq!(email.as_str(), "ana@x.com");
//!
//! assert!(SubscriptionTier::Shield > SubscriptionTier::Core);
//! assert_eq!(Role::default(), Role::User);
//! ```

mod email;
mod error;
mod id;
mod role;
mod tier;

pub use email::Email;
pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{EventId, TabId};
pub use role::Role;
pub use tier::{SubscriptionTier, TierError};
