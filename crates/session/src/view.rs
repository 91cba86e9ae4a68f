//! Session-aware access decisions for rendering code.

use tokio::sync::watch;

use backoffice_access::{
    CapabilityGate, ContextAction, ContextMenu, NavGroup, NavigationCatalog, authorize_actions,
};
use backoffice_auth::PermissionSet;

use crate::types::{Session, SessionStatus};

/// What a consumer should render for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<T> {
    /// Bootstrap has not resolved yet; render a loading placeholder.
    Loading,
    /// No authenticated actor (including while a login is in flight).
    Unauthenticated,
    Ready(T),
}

impl<T> ViewState<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            ViewState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready(_))
    }
}

/// A reader of the published session. Cheap to clone; never mutates it.
#[derive(Debug, Clone)]
pub struct AccessView {
    sessions: watch::Receiver<Session>,
}

impl AccessView {
    pub fn new(sessions: watch::Receiver<Session>) -> Self {
        Self { sessions }
    }

    fn with_permissions<T>(&self, f: impl FnOnce(&PermissionSet) -> T) -> ViewState<T> {
        let session = self.sessions.borrow();
        match session.status {
            SessionStatus::Bootstrapping => ViewState::Loading,
            SessionStatus::Unauthenticated | SessionStatus::Authenticating => {
                ViewState::Unauthenticated
            }
            SessionStatus::Authenticated => ViewState::Ready(f(&session.permissions)),
        }
    }

    pub fn permissions(&self) -> ViewState<PermissionSet> {
        self.with_permissions(PermissionSet::clone)
    }

    /// The navigation tree pruned to what the actor may see.
    pub fn navigation(&self, catalog: &NavigationCatalog) -> ViewState<Vec<NavGroup>> {
        self.with_permissions(|permissions| catalog.visible_to(permissions))
    }

    pub fn gate(&self, gate: &CapabilityGate) -> ViewState<bool> {
        self.with_permissions(|permissions| gate.allows(permissions))
    }

    /// `Ready(None)` means the menu must not be shown at all.
    pub fn context_menu(
        &self,
        actions: impl IntoIterator<Item = ContextAction>,
    ) -> ViewState<Option<ContextMenu>> {
        self.with_permissions(|permissions| authorize_actions(actions, permissions))
    }

    /// Wait for the next published transition. Returns `false` once the
    /// session store is gone.
    pub async fn changed(&mut self) -> bool {
        self.sessions.changed().await.is_ok()
    }
}
