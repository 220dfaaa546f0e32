//! Privilege registry
//!
//! One registry per running application instance. Core and plugin code
//! register their privileges before the registry is shared; lookups by name
//! go through it afterwards.

use std::collections::BTreeMap;

use crate::privilege::{Privilege, PrivilegeExpr, PrivilegeSet};
use crate::{builtin, Error, Result};

/// Name to privilege mapping with a designated super-privilege
#[derive(Debug, Clone)]
pub struct PrivilegeRegistry {
    privileges: BTreeMap<String, Privilege>,
    super_privilege: Privilege,
}

impl PrivilegeRegistry {
    /// Create a registry containing only the super-privilege
    pub fn new(super_privilege: Privilege) -> Result<Self> {
        let mut registry = Self {
            privileges: BTreeMap::new(),
            super_privilege: super_privilege.clone(),
        };
        registry.register(super_privilege)?;
        Ok(registry)
    }

    /// Registry with the built-in core privileges, `CLAN_ADMIN` as super-privilege
    pub fn with_builtins() -> Self {
        let mut privileges = BTreeMap::new();
        for privilege in builtin::core_privileges() {
            privileges.insert(privilege.name().to_string(), privilege);
        }
        Self {
            privileges,
            super_privilege: builtin::CLAN_ADMIN.clone(),
        }
    }

    /// Register a privilege
    ///
    /// Every dependency must already be registered with the same definition,
    /// which keeps the dependency graph acyclic.
    pub fn register(&mut self, privilege: Privilege) -> Result<()> {
        if let Some(existing) = self.privileges.get(privilege.name()) {
            if existing.same_definition(&privilege) {
                return Ok(());
            }
            return Err(Error::DuplicatePrivilege(privilege.name().to_string()));
        }

        if let Some(deps) = privilege.dependencies() {
            for dependency in deps.iter_privileges() {
                if dependency == privilege {
                    return Err(Error::CyclicDependency(privilege.name().to_string()));
                }
                match self.privileges.get(dependency.name()) {
                    Some(registered) if registered.same_definition(&dependency) => {}
                    _ => {
                        return Err(Error::UnregisteredDependency {
                            privilege: privilege.name().to_string(),
                            dependency: dependency.name().to_string(),
                        })
                    }
                }
            }
        }

        tracing::debug!(privilege = privilege.name(), "registered privilege");
        self.privileges.insert(privilege.name().to_string(), privilege);
        Ok(())
    }

    /// Register several privileges in order
    pub fn register_all(&mut self, privileges: impl IntoIterator<Item = Privilege>) -> Result<()> {
        for privilege in privileges {
            self.register(privilege)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Privilege> {
        self.privileges.get(name)
    }

    /// Look up a privilege, failing on unknown names
    pub fn lookup(&self, name: &str) -> Result<&Privilege> {
        self.privileges
            .get(name)
            .ok_or_else(|| Error::UnknownPrivilege(name.to_string()))
    }

    /// Resolve every name or fail on the first unknown one
    pub fn resolve<I, S>(&self, names: I) -> Result<Vec<Privilege>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| self.lookup(name.as_ref()).cloned())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.privileges.contains_key(name)
    }

    pub fn super_privilege(&self) -> &Privilege {
        &self.super_privilege
    }

    /// Layer the super-privilege over a requirement
    pub fn with_admin_override(&self, requirement: Option<PrivilegeExpr>) -> PrivilegeExpr {
        with_admin_override(&self.super_privilege, requirement)
    }

    /// Authorization check with the super-privilege override applied
    pub fn is_granted(&self, requirement: Option<&PrivilegeExpr>, held: &PrivilegeSet) -> bool {
        self.with_admin_override(requirement.cloned()).evaluate(held)
    }

    /// Registered privileges sorted by name
    pub fn iter(&self) -> impl Iterator<Item = &Privilege> {
        self.privileges.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.privileges.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.privileges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.privileges.is_empty()
    }
}

impl Default for PrivilegeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// `None` becomes the super-privilege alone, the super-privilege itself is
/// returned unchanged, anything else becomes `super | requirement`.
pub fn with_admin_override(
    super_privilege: &Privilege,
    requirement: Option<PrivilegeExpr>,
) -> PrivilegeExpr {
    match requirement {
        None => PrivilegeExpr::from(super_privilege),
        Some(expr) if expr.as_privilege() == Some(super_privilege) => expr,
        Some(expr) => PrivilegeExpr::from(super_privilege) | expr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{CLAN_ADMIN, ENTER_ADMIN_PANEL};

    #[test]
    fn test_builtins_registered() {
        let registry = PrivilegeRegistry::with_builtins();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.super_privilege().name(), "CLAN_ADMIN");
        assert!(registry.contains("ENTER_ACCOUNT_PANEL"));
        assert!(registry.lookup("NEWS_CREATE").is_err());
    }

    #[test]
    fn test_admin_override_grants_everything() {
        let registry = PrivilegeRegistry::with_builtins();
        let other = Privilege::new("X", "x");
        let held: PrivilegeSet = [CLAN_ADMIN.clone()].into_iter().collect();

        assert!(!other.evaluate(&held));
        assert!(registry
            .with_admin_override(Some(PrivilegeExpr::from(&other)))
            .evaluate(&held));
        assert!(registry.is_granted(None, &held));
        assert!(!registry.is_granted(None, &PrivilegeSet::new()));
    }

    #[test]
    fn test_admin_override_shapes() {
        let admin = CLAN_ADMIN.clone();

        assert_eq!(with_admin_override(&admin, None), PrivilegeExpr::from(&admin));
        assert_eq!(
            with_admin_override(&admin, Some(PrivilegeExpr::from(&admin))),
            PrivilegeExpr::from(&admin)
        );

        let panel = ENTER_ADMIN_PANEL.clone();
        let expr = with_admin_override(&admin, Some(PrivilegeExpr::from(&panel)));
        assert_eq!(expr.to_string(), "(CLAN_ADMIN | ENTER_ADMIN_PANEL)");
    }

    #[test]
    fn test_register_rejects_unregistered_dependency() {
        let mut registry = PrivilegeRegistry::with_builtins();
        let stray = Privilege::new("STRAY", "not registered");
        let dependent = Privilege::with_dependencies("DEPENDENT", "needs stray", &stray);

        assert_eq!(
            registry.register(dependent.clone()),
            Err(Error::UnregisteredDependency {
                privilege: "DEPENDENT".to_string(),
                dependency: "STRAY".to_string(),
            })
        );

        registry.register(stray).unwrap();
        registry.register(dependent).unwrap();
        assert!(registry.contains("DEPENDENT"));
    }

    #[test]
    fn test_register_rejects_self_dependency() {
        let mut registry = PrivilegeRegistry::with_builtins();
        let placeholder = Privilege::new("LOOP", "placeholder");
        let looping = Privilege::with_dependencies("LOOP", "depends on itself", &placeholder);

        assert_eq!(
            registry.register(looping),
            Err(Error::CyclicDependency("LOOP".to_string()))
        );
    }

    #[test]
    fn test_register_duplicates() {
        let mut registry = PrivilegeRegistry::with_builtins();
        let first = Privilege::new("SHOUT", "can shout");

        registry.register(first.clone()).unwrap();
        // identical definition is a no-op
        registry.register(Privilege::new("SHOUT", "can shout")).unwrap();
        assert_eq!(
            registry.register(Privilege::new("SHOUT", "something else")),
            Err(Error::DuplicatePrivilege("SHOUT".to_string()))
        );
    }

    #[test]
    fn test_resolve_fails_on_unknown() {
        let registry = PrivilegeRegistry::with_builtins();
        let resolved = registry.resolve(["CLAN_ADMIN", "ENTER_ADMIN_PANEL"]).unwrap();
        assert_eq!(resolved.len(), 2);

        assert_eq!(
            registry.resolve(["CLAN_ADMIN", "NOPE"]),
            Err(Error::UnknownPrivilege("NOPE".to_string()))
        );
    }

    #[test]
    fn test_custom_super_privilege() {
        let root = Privilege::new("ROOT", "root");
        let registry = PrivilegeRegistry::new(root.clone()).unwrap();
        let held: PrivilegeSet = [root].into_iter().collect();

        assert!(registry.is_granted(Some(&PrivilegeExpr::from(&*CLAN_ADMIN)), &held));
    }
}
