//! The immutable set of permission names granted to the current actor.

use std::collections::HashSet;
use std::sync::Arc;

use crate::{Actor, Permission, PermissionSpec, evaluator};

#[derive(Debug, Default)]
struct Inner {
    ordered: Vec<Permission>,
    index: HashSet<Permission>,
}

/// Permission names extracted from `actor.role.permisos`.
///
/// Cheap to clone (shared, immutable). A new set is derived every time the
/// actor is replaced; there is no way to mutate one in place.
#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    inner: Arc<Inner>,
}

impl PermissionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Derive the set from an actor's role.
    pub fn from_actor(actor: &Actor) -> Self {
        let set = Self::from_names(actor.role.permission_names().cloned());
        tracing::debug!(actor = %actor.id, granted = set.len(), "derived permission set");
        set
    }

    /// Build from names; duplicates keep their first position.
    pub fn from_names<I, P>(names: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        let mut inner = Inner::default();
        for name in names {
            let name = name.into();
            if inner.index.insert(name.clone()) {
                inner.ordered.push(name);
            }
        }
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.index.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.inner.ordered.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.ordered.is_empty()
    }

    /// See [`evaluator::has`].
    pub fn has(&self, name: &str) -> bool {
        evaluator::has(self, name)
    }

    /// See [`evaluator::has_any`].
    pub fn has_any<P: AsRef<str>>(&self, names: &[P]) -> bool {
        evaluator::has_any(self, Some(names))
    }

    /// See [`evaluator::has_all`].
    pub fn has_all<P: AsRef<str>>(&self, names: &[P]) -> bool {
        evaluator::has_all(self, names)
    }

    /// Evaluate a declarative requirement against this set.
    pub fn allows(&self, spec: &PermissionSpec) -> bool {
        match spec {
            PermissionSpec::Unrestricted => true,
            PermissionSpec::AnyOf(names) => self.has_any(names),
            PermissionSpec::AllOf(names) => self.has_all(names),
        }
    }
}

impl PartialEq for PermissionSet {
    fn eq(&self, other: &Self) -> bool {
        self.inner.ordered == other.inner.ordered
    }
}

impl Eq for PermissionSet {}
