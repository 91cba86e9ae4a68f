//! Contextual action menus: permission filtering and handler dispatch.
//!
//! Actions are data-only descriptors. Behavior is looked up by [`ActionId`]
//! in an [`ActionRegistry`], so filtering can be tested without any handler.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use backoffice_auth::{Permission, PermissionSet};
use backoffice_core::ActionId;

/// Styling hint for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionTone {
    Neutral,
    Primary,
    Warning,
    Danger,
}

/// A single entry of a context menu, constructed per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextAction {
    pub id: ActionId,
    pub label: String,

    /// Actions without a requirement are always shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Permission>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<ActionTone>,
}

impl ContextAction {
    pub fn new(id: ActionId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            required: None,
            tone: None,
        }
    }

    pub fn requiring(mut self, permission: impl Into<Permission>) -> Self {
        self.required = Some(permission.into());
        self
    }

    pub fn with_tone(mut self, tone: ActionTone) -> Self {
        self.tone = Some(tone);
        self
    }

    fn permitted(&self, permissions: &PermissionSet) -> bool {
        self.required
            .as_ref()
            .is_none_or(|p| permissions.has(p.as_str()))
    }
}

/// Filter `actions` down to what `permissions` allows, keeping order.
///
/// Returns `None` when nothing survives: the caller must not show an empty
/// menu.
pub fn authorize_actions(
    actions: impl IntoIterator<Item = ContextAction>,
    permissions: &PermissionSet,
) -> Option<ContextMenu> {
    let actions: Vec<ContextAction> = actions
        .into_iter()
        .filter(|a| a.permitted(permissions))
        .collect();

    if actions.is_empty() {
        tracing::debug!("context menu suppressed: no permitted actions");
        return None;
    }

    Some(ContextMenu {
        actions,
        open: true,
    })
}

/// Action handler: runs on the async runtime; failures are logged.
pub type ActionHandler = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Default time a menu waits for its handler before dismissing anyway.
pub const DEFAULT_DISMISS_GRACE: Duration = Duration::from_millis(250);

/// Lookup table from action id to behavior.
#[derive(Clone)]
pub struct ActionRegistry {
    handlers: HashMap<ActionId, ActionHandler>,
    dismiss_grace: Duration,
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
            dismiss_grace: DEFAULT_DISMISS_GRACE,
        }
    }
}

impl core::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.handlers.keys().collect::<Vec<_>>())
            .field("dismiss_grace", &self.dismiss_grace)
            .finish()
    }
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dismiss_grace(mut self, grace: Duration) -> Self {
        self.dismiss_grace = grace;
        self
    }

    /// Register the handler for an action id, replacing any previous one.
    pub fn register<F, Fut>(&mut self, id: ActionId, handler: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.handlers
            .insert(id, Arc::new(move || handler().boxed()));
    }

    pub fn get(&self, id: &ActionId) -> Option<&ActionHandler> {
        self.handlers.get(id)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MenuError {
    #[error("context menu is already closed")]
    Closed,

    #[error("action '{0}' is not available in this menu")]
    NotPermitted(ActionId),

    #[error("no handler registered for action '{0}'")]
    UnknownAction(ActionId),
}

/// How an invoked handler ended relative to menu dismissal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeOutcome {
    /// Handler finished successfully before the menu closed.
    Completed,
    /// Handler finished with an error (already logged).
    Failed(String),
    /// Grace period elapsed; the menu closed while the handler keeps running.
    StillRunning,
}

/// An open, non-empty menu of permitted actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMenu {
    actions: Vec<ContextAction>,
    open: bool,
}

impl ContextMenu {
    pub fn actions(&self) -> &[ContextAction] {
        &self.actions
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Run the handler for `id`, then dismiss the menu.
    ///
    /// The handler is polled in place, so it always reaches its first
    /// suspension point before the menu can close. It then gets up to the
    /// registry's dismiss grace to finish; a slower handler is moved onto the
    /// runtime and keeps running detached while the menu closes.
    pub async fn invoke(
        &mut self,
        id: &ActionId,
        registry: &ActionRegistry,
    ) -> Result<InvokeOutcome, MenuError> {
        if !self.open {
            return Err(MenuError::Closed);
        }
        if !self.actions.iter().any(|a| &a.id == id) {
            return Err(MenuError::NotPermitted(id.clone()));
        }
        let handler = registry
            .get(id)
            .ok_or_else(|| MenuError::UnknownAction(id.clone()))?;

        let mut run = AssertUnwindSafe(handler()).catch_unwind();
        let outcome = tokio::select! {
            biased;
            finished = &mut run => settle(id, finished),
            _ = tokio::time::sleep(registry.dismiss_grace) => {
                tracing::debug!(action = %id, "context action still running at dismissal");
                let id = id.clone();
                tokio::spawn(async move {
                    settle(&id, run.await);
                });
                InvokeOutcome::StillRunning
            }
        };

        self.close();
        Ok(outcome)
    }
}

fn settle(
    id: &ActionId,
    finished: Result<anyhow::Result<()>, Box<dyn Any + Send>>,
) -> InvokeOutcome {
    match finished {
        Ok(Ok(())) => InvokeOutcome::Completed,
        Ok(Err(e)) => {
            tracing::warn!(action = %id, error = %e, "context action failed");
            InvokeOutcome::Failed(e.to_string())
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "handler panicked".to_string());
            tracing::error!(action = %id, error = %message, "context action panicked");
            InvokeOutcome::Failed(message)
        }
    }
}
