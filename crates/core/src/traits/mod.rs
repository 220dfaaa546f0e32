//! Collaborator traits for privilege binding
//!
//! ```text
//! PrivilegeContainer: mutable set of privileges owned by a persisted entity
//! RevocationHook: side effects after a privilege is taken away
//! SubscriptionStore: notification subscriptions of one principal
//! ```

mod container;
mod subscriptions;

pub use container::{PrivilegeContainer, RevocationHook};
pub use subscriptions::{
    InMemorySubscriptionStore, NotificationSubscription, PruneReport, SubscriptionPruner,
    SubscriptionStore,
};
