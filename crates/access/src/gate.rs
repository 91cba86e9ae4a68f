//! Declarative conditional rendering driven by permissions.

use backoffice_auth::{Permission, PermissionSet, PermissionSpec};

/// What a gate requires: nothing, one name, or a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Required {
    #[default]
    Nothing,
    One(Permission),
    Many(Vec<Permission>),
}

/// Wraps content that renders only when the actor's permissions satisfy the
/// requirement.
///
/// | required            | `all`  | renders iff                 |
/// |---------------------|--------|-----------------------------|
/// | absent / empty      | any    | always                      |
/// | list                | `true` | every name is granted       |
/// | list                | `false`| `has_any(list)`             |
/// | single name         | any    | `has(name)`                 |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityGate {
    required: Required,
    all: bool,
}

impl CapabilityGate {
    /// Pass-through gate.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn one(name: impl Into<Permission>) -> Self {
        Self {
            required: Required::One(name.into()),
            all: false,
        }
    }

    pub fn list<I, P>(names: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        Self {
            required: Required::Many(names.into_iter().map(Into::into).collect()),
            all: false,
        }
    }

    /// Require every listed name instead of any.
    pub fn require_all(mut self, all: bool) -> Self {
        self.all = all;
        self
    }

    pub fn allows(&self, permissions: &PermissionSet) -> bool {
        match &self.required {
            Required::Nothing => true,
            Required::One(name) if name.as_str().is_empty() => true,
            Required::One(name) => permissions.has(name.as_str()),
            Required::Many(names) if names.is_empty() => true,
            Required::Many(names) if self.all => permissions.has_all(names),
            Required::Many(names) => permissions.has_any(names),
        }
    }

    /// Produce the wrapped content only when allowed.
    pub fn render<T>(&self, permissions: &PermissionSet, content: impl FnOnce() -> T) -> Option<T> {
        self.allows(permissions).then(content)
    }

    /// Produce `content` when allowed, otherwise `fallback`.
    pub fn render_or_else<T>(
        &self,
        permissions: &PermissionSet,
        content: impl FnOnce() -> T,
        fallback: impl FnOnce() -> T,
    ) -> T {
        if self.allows(permissions) {
            content()
        } else {
            fallback()
        }
    }
}

impl From<&PermissionSpec> for CapabilityGate {
    fn from(spec: &PermissionSpec) -> Self {
        match spec {
            PermissionSpec::Unrestricted => Self::open(),
            PermissionSpec::AnyOf(names) => Self::list(names.iter().cloned()),
            PermissionSpec::AllOf(names) => Self::list(names.iter().cloned()).require_all(true),
        }
    }
}
