//! Session snapshot and lifecycle result types.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backoffice_auth::{Actor, PermissionSet};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Process start; the stored credential (if any) is being checked.
    Bootstrapping,
    Unauthenticated,
    /// A login is in flight. Gating treats this as unauthenticated.
    Authenticating,
    Authenticated,
}

impl core::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SessionStatus::Bootstrapping => write!(f, "bootstrapping"),
            SessionStatus::Unauthenticated => write!(f, "unauthenticated"),
            SessionStatus::Authenticating => write!(f, "authenticating"),
            SessionStatus::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// Immutable snapshot published to every consumer on each transition.
///
/// `permissions` is always derived from `actor`; both are replaced together.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub status: SessionStatus,
    pub actor: Option<Arc<Actor>>,
    pub permissions: PermissionSet,
    pub authenticated_at: Option<DateTime<Utc>>,

    /// Bumped by every successful bootstrap or login and kept across
    /// refreshes. Zero while signed out.
    pub generation: u64,
}

impl Session {
    pub(crate) fn bootstrapping() -> Self {
        Self {
            status: SessionStatus::Bootstrapping,
            ..Self::signed_out()
        }
    }

    pub(crate) fn signed_out() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            actor: None,
            permissions: PermissionSet::empty(),
            authenticated_at: None,
            generation: 0,
        }
    }

    pub(crate) fn signed_in(actor: Actor, authenticated_at: DateTime<Utc>, generation: u64) -> Self {
        let permissions = PermissionSet::from_actor(&actor);
        Self {
            status: SessionStatus::Authenticated,
            actor: Some(Arc::new(actor)),
            permissions,
            authenticated_at: Some(authenticated_at),
            generation,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }
}

/// Result of `login` and `refresh_permissions`: never an `Err`, always a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthOutcome {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AuthOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}
