//! Users and groups holding privileges

use std::collections::HashSet;

use serde::Serialize;

use crate::builtin::ENTER_ADMIN_PANEL;
use crate::privilege::{Privilege, PrivilegeExpr, PrivilegeSet};
use crate::registry::PrivilegeRegistry;

/// Anything that can hold privileges
pub trait Principal {
    /// Everything granted, directly or through memberships
    fn held_privileges(&self) -> PrivilegeSet;

    /// Authorization check with the super-privilege override applied
    fn has_privilege(
        &self,
        registry: &PrivilegeRegistry,
        requirement: Option<&PrivilegeExpr>,
    ) -> bool {
        registry.is_granted(requirement, &self.held_privileges())
    }

    fn is_admin(&self, registry: &PrivilegeRegistry) -> bool {
        let admin = PrivilegeExpr::from(registry.super_privilege());
        self.has_privilege(registry, Some(&admin))
    }

    /// Can enter the admin panel
    fn is_manager(&self, registry: &PrivilegeRegistry) -> bool {
        let panel = PrivilegeExpr::from(&*ENTER_ADMIN_PANEL);
        self.has_privilege(registry, Some(&panel))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Group {
    pub name: String,
    pub privileges: HashSet<Privilege>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            privileges: HashSet::new(),
        }
    }
}

impl Principal for Group {
    fn held_privileges(&self) -> PrivilegeSet {
        self.privileges.clone()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct User {
    pub username: String,
    /// Privileges granted to the user directly
    pub own_privileges: HashSet<Privilege>,
    pub groups: Vec<Group>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    /// The nobody user; holds nothing
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// False for the anonymous user
    pub fn is_somebody(&self) -> bool {
        !self.username.is_empty()
    }
}

impl Principal for User {
    fn held_privileges(&self) -> PrivilegeSet {
        let mut held = self.own_privileges.clone();
        for group in &self.groups {
            held.extend(group.privileges.iter().cloned());
        }
        held
    }
}
