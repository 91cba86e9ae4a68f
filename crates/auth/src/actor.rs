//! Actor record returned by the identity service's "who am I" call.

use serde::{Deserialize, Serialize};

use backoffice_core::ActorId;

use crate::Role;

/// The authenticated identity using the console.
///
/// Replaced wholesale on login/refresh; only [`ActorPatch`] mutates it locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,

    /// Display name.
    #[serde(alias = "nombre", default)]
    pub name: String,

    /// Login handle.
    #[serde(alias = "usuario", default)]
    pub username: String,

    /// Avatar reference (URL or storage key).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    pub role: Role,
}

/// Local-only optimistic update of actor fields.
///
/// The role is deliberately absent: a patch never changes what the actor may do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// `Some(None)` clears the avatar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Option<String>>,
}

impl ActorPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.username.is_none() && self.avatar.is_none()
    }
}

impl Actor {
    /// Merge a patch into this actor, returning the updated copy.
    pub fn merged(&self, patch: &ActorPatch) -> Self {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.name = name.clone();
        }
        if let Some(username) = &patch.username {
            next.username = username.clone();
        }
        if let Some(avatar) = &patch.avatar {
            next.avatar = avatar.clone();
        }
        next
    }
}
