//! Core privilege types for the clan community system
//!
//! This crate provides:
//! - Privileges and composable privilege expressions
//! - The per-instance privilege registry with the super-privilege override
//! - Built-in and plugin privilege catalogs
//! - Dependency-aware binding of privilege names to users and groups
//! - Collaborator traits (containers, revocation hooks, subscriptions)

pub mod bind;
pub mod builtin;
pub mod error;
pub mod principal;
pub mod privilege;
pub mod registry;
pub mod traits;

pub use bind::{bind_privileges, BindOutcome};
pub use error::{Error, Result};
pub use principal::{Group, Principal, User};
pub use privilege::{check, Privilege, PrivilegeExpr, PrivilegeSet};
pub use registry::{with_admin_override, PrivilegeRegistry};

pub use traits::{
    InMemorySubscriptionStore, NotificationSubscription, PrivilegeContainer, PruneReport,
    RevocationHook, SubscriptionPruner, SubscriptionStore,
};
