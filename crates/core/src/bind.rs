//! Binding privilege names to a principal's container
//!
//! Used when an admin assigns a new set of privileges to a user or group.
//! Every requested name is resolved before anything is touched, so an
//! unknown name leaves the container as it was. After a successful bind the
//! container holds exactly the requested privileges plus their dependency
//! closures.

use std::collections::BTreeSet;

use crate::privilege::Privilege;
use crate::registry::PrivilegeRegistry;
use crate::traits::{PrivilegeContainer, RevocationHook};
use crate::Result;

/// Net effect of a bind on the container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindOutcome {
    /// Privileges that were not attached before, sorted by name
    pub granted: Vec<Privilege>,
    /// Privileges that are no longer attached, sorted by name
    pub revoked: Vec<Privilege>,
}

impl BindOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.granted.is_empty() && self.revoked.is_empty()
    }
}

/// Replace the privileges in `container` with `requested`
///
/// Privileges being removed take their dependency closure with them; added
/// privileges bring theirs along. Once the container has reached its final
/// state, `hook` is told about every removed privilege that stayed removed,
/// together with the dependencies that were actually lost. Persisting the
/// container is the caller's job.
pub fn bind_privileges<C, I, S, H>(
    container: &mut C,
    requested: I,
    registry: &PrivilegeRegistry,
    hook: &mut H,
) -> Result<BindOutcome>
where
    C: PrivilegeContainer + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    H: RevocationHook + ?Sized,
{
    let requested: BTreeSet<Privilege> = registry.resolve(requested)?.into_iter().collect();
    let before: BTreeSet<Privilege> = container.attached().into_iter().collect();

    let mut removals = Vec::new();
    for privilege in before.difference(&requested) {
        let definition = registry.get(privilege.name()).unwrap_or(privilege);
        let dependencies = definition.dependency_closure();

        container.detach(privilege);
        for dependency in &dependencies {
            container.detach(dependency);
        }
        removals.push((privilege.clone(), dependencies));
    }

    for privilege in &requested {
        container.attach(privilege.clone());
        for dependency in privilege.dependency_closure() {
            container.attach(dependency);
        }
    }

    let after: BTreeSet<Privilege> = container.attached().into_iter().collect();
    for (privilege, dependencies) in removals {
        // re-granted as a dependency of something requested
        if after.contains(&privilege) {
            continue;
        }
        let lost: Vec<Privilege> = dependencies
            .into_iter()
            .filter(|dependency| !after.contains(dependency))
            .collect();
        hook.privilege_revoked(&privilege, &lost);
    }

    let outcome = BindOutcome {
        granted: after.difference(&before).cloned().collect(),
        revoked: before.difference(&after).cloned().collect(),
    };
    tracing::debug!(
        granted = ?outcome.granted,
        revoked = ?outcome.revoked,
        "bound privileges"
    );
    Ok(outcome)
}
