//! Privilege containers and revocation hooks

use std::collections::{BTreeSet, HashSet};

use crate::privilege::Privilege;

/// Mutable set of privileges owned by some external entity
///
/// Binding only mutates the container. Persisting the change is up to the
/// caller.
pub trait PrivilegeContainer {
    /// Privileges currently attached
    fn attached(&self) -> Vec<Privilege>;

    /// Attach a privilege, returning false if it was already present
    fn attach(&mut self, privilege: Privilege) -> bool;

    /// Detach a privilege, returning false if it was absent
    fn detach(&mut self, privilege: &Privilege) -> bool;

    fn has(&self, privilege: &Privilege) -> bool {
        self.attached().contains(privilege)
    }
}

impl PrivilegeContainer for HashSet<Privilege> {
    fn attached(&self) -> Vec<Privilege> {
        self.iter().cloned().collect()
    }

    fn attach(&mut self, privilege: Privilege) -> bool {
        self.insert(privilege)
    }

    fn detach(&mut self, privilege: &Privilege) -> bool {
        self.remove(privilege)
    }

    fn has(&self, privilege: &Privilege) -> bool {
        self.contains(privilege)
    }
}

impl PrivilegeContainer for BTreeSet<Privilege> {
    fn attached(&self) -> Vec<Privilege> {
        self.iter().cloned().collect()
    }

    fn attach(&mut self, privilege: Privilege) -> bool {
        self.insert(privilege)
    }

    fn detach(&mut self, privilege: &Privilege) -> bool {
        self.remove(privilege)
    }

    fn has(&self, privilege: &Privilege) -> bool {
        self.contains(privilege)
    }
}

/// Called once per privilege taken away by a bind
pub trait RevocationHook {
    /// `dependencies` is the dependency closure that was stripped with it
    fn privilege_revoked(&mut self, privilege: &Privilege, dependencies: &[Privilege]);
}

/// No side effects
impl RevocationHook for () {
    fn privilege_revoked(&mut self, _privilege: &Privilege, _dependencies: &[Privilege]) {}
}

/// Records every revocation, mostly useful in tests
impl RevocationHook for Vec<Privilege> {
    fn privilege_revoked(&mut self, privilege: &Privilege, _dependencies: &[Privilege]) {
        self.push(privilege.clone());
    }
}
