//! Privileges and privilege expressions
//!
//! A [`Privilege`] is an atomic named capability. Privileges compose into
//! [`PrivilegeExpr`] trees with `&` and `|`:
//!
//! ```
//! use clansphere_core::{Privilege, PrivilegeSet};
//!
//! let create = Privilege::new("NEWS_CREATE", "can create news");
//! let edit = Privilege::new("NEWS_EDIT", "can edit news");
//! let either = &create | &edit;
//!
//! let held: PrivilegeSet = [edit.clone()].into_iter().collect();
//! assert!(either.evaluate(&held));
//! assert!(!(&create & &edit).evaluate(&held));
//! ```

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{BitAnd, BitOr};
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// Set of privileges held by a principal
pub type PrivilegeSet = HashSet<Privilege>;

#[derive(Debug)]
struct PrivilegeDef {
    name: String,
    explanation: String,
    dependencies: Option<PrivilegeExpr>,
}

/// Atomic named capability
///
/// Cheap to clone. Equality, ordering and hashing use the name only, so two
/// handles with the same name are the same privilege as far as held sets are
/// concerned.
#[derive(Clone)]
pub struct Privilege(Arc<PrivilegeDef>);

impl Privilege {
    /// Create a privilege without dependencies
    pub fn new(name: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self(Arc::new(PrivilegeDef {
            name: name.into(),
            explanation: explanation.into(),
            dependencies: None,
        }))
    }

    /// Create a privilege that grants `dependencies` alongside itself
    pub fn with_dependencies(
        name: impl Into<String>,
        explanation: impl Into<String>,
        dependencies: impl Into<PrivilegeExpr>,
    ) -> Self {
        Self(Arc::new(PrivilegeDef {
            name: name.into(),
            explanation: explanation.into(),
            dependencies: Some(dependencies.into()),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn explanation(&self) -> &str {
        &self.0.explanation
    }

    pub fn dependencies(&self) -> Option<&PrivilegeExpr> {
        self.0.dependencies.as_ref()
    }

    /// True if this privilege is in the held set
    pub fn evaluate(&self, held: &PrivilegeSet) -> bool {
        held.contains(self)
    }

    /// Every privilege reachable through the dependency graph, excluding self
    ///
    /// Each privilege appears once, in depth-first order.
    pub fn dependency_closure(&self) -> Vec<Privilege> {
        let mut seen = HashSet::new();
        seen.insert(self.clone());
        let mut out = Vec::new();
        let mut stack: Vec<Privilege> = match self.dependencies() {
            Some(deps) => deps.iter_privileges().into_iter().rev().collect(),
            None => return out,
        };

        while let Some(privilege) = stack.pop() {
            if !seen.insert(privilege.clone()) {
                continue;
            }
            if let Some(deps) = privilege.dependencies() {
                stack.extend(deps.iter_privileges().into_iter().rev());
            }
            out.push(privilege);
        }
        out
    }

    /// True if both handles carry the same name, explanation and dependencies
    pub fn same_definition(&self, other: &Privilege) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.name == other.0.name
                && self.0.explanation == other.0.explanation
                && self.0.dependencies == other.0.dependencies)
    }
}

impl PartialEq for Privilege {
    fn eq(&self, other: &Self) -> bool {
        self.0.name == other.0.name
    }
}

impl Eq for Privilege {}

impl Hash for Privilege {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

impl PartialOrd for Privilege {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Privilege {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.name.cmp(&other.0.name)
    }
}

impl fmt::Debug for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

impl Serialize for Privilege {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.name)
    }
}

/// Boolean expression tree over privileges
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivilegeExpr {
    Privilege(Privilege),
    And(Box<PrivilegeExpr>, Box<PrivilegeExpr>),
    Or(Box<PrivilegeExpr>, Box<PrivilegeExpr>),
}

impl PrivilegeExpr {
    /// Evaluate against a held set, short-circuiting left to right
    pub fn evaluate(&self, held: &PrivilegeSet) -> bool {
        match self {
            Self::Privilege(privilege) => privilege.evaluate(held),
            Self::And(a, b) => a.evaluate(held) && b.evaluate(held),
            Self::Or(a, b) => a.evaluate(held) || b.evaluate(held),
        }
    }

    /// Distinct leaf privileges, left before right
    pub fn iter_privileges(&self) -> Vec<Privilege> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.collect_leaves(&mut seen, &mut out);
        out
    }

    fn collect_leaves(&self, seen: &mut HashSet<Privilege>, out: &mut Vec<Privilege>) {
        match self {
            Self::Privilege(privilege) => {
                if seen.insert(privilege.clone()) {
                    out.push(privilege.clone());
                }
            }
            Self::And(a, b) | Self::Or(a, b) => {
                a.collect_leaves(seen, out);
                b.collect_leaves(seen, out);
            }
        }
    }

    /// True if `privilege` appears as a leaf anywhere in the tree
    pub fn mentions(&self, privilege: &Privilege) -> bool {
        match self {
            Self::Privilege(p) => p == privilege,
            Self::And(a, b) | Self::Or(a, b) => a.mentions(privilege) || b.mentions(privilege),
        }
    }

    /// The single privilege if this expression is a bare leaf
    pub fn as_privilege(&self) -> Option<&Privilege> {
        match self {
            Self::Privilege(privilege) => Some(privilege),
            _ => None,
        }
    }
}

/// Check an optional requirement; no requirement always passes
pub fn check(requirement: Option<&PrivilegeExpr>, held: &PrivilegeSet) -> bool {
    requirement.map_or(true, |expr| expr.evaluate(held))
}

impl fmt::Display for PrivilegeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Privilege(privilege) => write!(f, "{privilege}"),
            Self::And(a, b) => write!(f, "({a} & {b})"),
            Self::Or(a, b) => write!(f, "({a} | {b})"),
        }
    }
}

impl From<Privilege> for PrivilegeExpr {
    fn from(privilege: Privilege) -> Self {
        Self::Privilege(privilege)
    }
}

impl From<&Privilege> for PrivilegeExpr {
    fn from(privilege: &Privilege) -> Self {
        Self::Privilege(privilege.clone())
    }
}

impl From<&PrivilegeExpr> for PrivilegeExpr {
    fn from(expr: &PrivilegeExpr) -> Self {
        expr.clone()
    }
}

impl<R: Into<PrivilegeExpr>> BitAnd<R> for PrivilegeExpr {
    type Output = PrivilegeExpr;

    fn bitand(self, rhs: R) -> PrivilegeExpr {
        PrivilegeExpr::And(Box::new(self), Box::new(rhs.into()))
    }
}

impl<R: Into<PrivilegeExpr>> BitOr<R> for PrivilegeExpr {
    type Output = PrivilegeExpr;

    fn bitor(self, rhs: R) -> PrivilegeExpr {
        PrivilegeExpr::Or(Box::new(self), Box::new(rhs.into()))
    }
}

impl<R: Into<PrivilegeExpr>> BitAnd<R> for Privilege {
    type Output = PrivilegeExpr;

    fn bitand(self, rhs: R) -> PrivilegeExpr {
        PrivilegeExpr::from(self) & rhs
    }
}

impl<R: Into<PrivilegeExpr>> BitOr<R> for Privilege {
    type Output = PrivilegeExpr;

    fn bitor(self, rhs: R) -> PrivilegeExpr {
        PrivilegeExpr::from(self) | rhs
    }
}

impl<R: Into<PrivilegeExpr>> BitAnd<R> for &Privilege {
    type Output = PrivilegeExpr;

    fn bitand(self, rhs: R) -> PrivilegeExpr {
        PrivilegeExpr::from(self) & rhs
    }
}

impl<R: Into<PrivilegeExpr>> BitOr<R> for &Privilege {
    type Output = PrivilegeExpr;

    fn bitor(self, rhs: R) -> PrivilegeExpr {
        PrivilegeExpr::from(self) | rhs
    }
}
