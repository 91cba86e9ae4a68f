use std::borrow::{Borrow, Cow};

use serde::{Deserialize, Serialize};

/// Universal-grant sentinel.
///
/// Requiring `"all"` means "grant unconditionally"; it is never checked
/// against the actor's granted names.
pub const ALL: &str = "all";

/// Permission identifier.
///
/// Permissions are opaque dotted tokens issued by the identity service
/// (e.g. `"inventario.crear"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_universal(&self) -> bool {
        self.as_str() == ALL
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for Permission {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<&'static str> for Permission {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Permission {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Permission as it appears inside `role.permisos` on the wire: `{"nombre": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    #[serde(rename = "nombre")]
    pub name: Permission,
}

impl PermissionRecord {
    pub fn new(name: impl Into<Permission>) -> Self {
        Self { name: name.into() }
    }
}
