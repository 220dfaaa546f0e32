//! Notification subscriptions tied to privileges
//!
//! A subscription is only useful while its owner still holds the privileges
//! the notification type requires. [`SubscriptionPruner`] drops the ones a
//! revocation made unreachable.

use serde::Serialize;

use super::RevocationHook;
use crate::privilege::{Privilege, PrivilegeExpr};

/// One notification subscription of a principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSubscription {
    /// Storage identity
    pub id: u64,
    /// Notification type identifier
    pub notification_type: String,
    /// Privileges the notification type requires, if any
    pub requirement: Option<PrivilegeExpr>,
}

impl NotificationSubscription {
    /// True if the requirement mentions any of the given privileges
    pub fn requires_any(&self, privileges: &[&Privilege]) -> bool {
        match &self.requirement {
            Some(expr) => privileges.iter().any(|p| expr.mentions(p)),
            None => false,
        }
    }
}

/// Persisted subscriptions of one principal
pub trait SubscriptionStore {
    fn subscriptions(&self) -> Vec<NotificationSubscription>;

    /// Delete by identity, returning false if it was already gone
    fn delete_subscription(&mut self, id: u64) -> bool;
}

/// Vec-backed store
#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriptionStore {
    subscriptions: Vec<NotificationSubscription>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        notification_type: impl Into<String>,
        requirement: Option<PrivilegeExpr>,
    ) -> u64 {
        let id = self.subscriptions.iter().map(|s| s.id).max().map_or(1, |max| max + 1);
        self.subscriptions.push(NotificationSubscription {
            id,
            notification_type: notification_type.into(),
            requirement,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl SubscriptionStore for InMemorySubscriptionStore {
    fn subscriptions(&self) -> Vec<NotificationSubscription> {
        self.subscriptions.clone()
    }

    fn delete_subscription(&mut self, id: u64) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }
}

/// Revocation hook that deletes subscriptions needing a revoked privilege
pub struct SubscriptionPruner<'a, S: SubscriptionStore> {
    store: &'a mut S,
    deleted: Vec<u64>,
}

/// Summary of what a pruner removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub deleted: Vec<u64>,
}

impl<'a, S: SubscriptionStore> SubscriptionPruner<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self {
            store,
            deleted: Vec::new(),
        }
    }

    /// Ids deleted so far
    pub fn deleted(&self) -> &[u64] {
        &self.deleted
    }

    pub fn finish(self) -> PruneReport {
        PruneReport {
            deleted: self.deleted,
        }
    }
}

impl<S: SubscriptionStore> RevocationHook for SubscriptionPruner<'_, S> {
    fn privilege_revoked(&mut self, privilege: &Privilege, dependencies: &[Privilege]) {
        let mut revoked: Vec<&Privilege> = vec![privilege];
        revoked.extend(dependencies.iter());

        for subscription in self.store.subscriptions() {
            if !subscription.requires_any(&revoked) {
                continue;
            }
            if self.store.delete_subscription(subscription.id) {
                tracing::debug!(
                    subscription = subscription.id,
                    notification_type = %subscription.notification_type,
                    privilege = privilege.name(),
                    "dropped subscription after privilege revocation"
                );
                self.deleted.push(subscription.id);
            }
        }
    }
}
