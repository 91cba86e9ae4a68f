use serde::{Deserialize, Serialize};

use crate::{Permission, PermissionRecord};

/// Role embedded in the actor record.
///
/// Read-only from the client's perspective; the permission list order is the
/// order the service sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(alias = "nombre", default)]
    pub name: String,

    #[serde(rename = "permisos", default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<PermissionRecord>>,
}

impl Role {
    pub fn new(name: impl Into<String>, permissions: Vec<PermissionRecord>) -> Self {
        Self {
            name: name.into(),
            permissions: Some(permissions),
        }
    }

    /// Permission names in wire order; empty when `permisos` is absent.
    pub fn permission_names(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter().flatten().map(|p| &p.name)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}
