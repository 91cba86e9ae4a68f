//! The process-wide session: actor, permissions and lifecycle.
//!
//! One [`SessionStore`] is constructed per running client and shared by
//! reference (`Arc`) with everything that gates on permissions. Every
//! transition publishes a fresh [`Session`] snapshot on a `watch` channel.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tokio::sync::watch;

use backoffice_auth::{Actor, ActorPatch, PermissionSet};

use crate::client::IdentityService;
use crate::error::ServiceError;
use crate::token_store::TokenStore;
use crate::types::{AuthOutcome, Session, SessionStatus};
use crate::view::AccessView;

const SESSION_CLOSED: &str = "The session was closed before sign-in finished";

/// Single writer of session state.
///
/// Clearing transitions (logout, failed bootstrap) bump an epoch; a login or
/// refresh whose remote call started under an older epoch is discarded when
/// it settles, so a late response can never resurrect a cleared session.
pub struct SessionStore {
    service: Arc<dyn IdentityService>,
    tokens: Arc<dyn TokenStore>,
    state: watch::Sender<Session>,
    epoch: Mutex<u64>,
    sign_ins: AtomicU64,
    bootstrapped: AtomicBool,
}

impl core::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionStore")
            .field("status", &self.status())
            .field("bootstrapped", &self.bootstrapped.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a store in `Bootstrapping`. Call [`bootstrap`](Self::bootstrap) once.
    pub fn new(service: Arc<dyn IdentityService>, tokens: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(Session::bootstrapping());
        Self {
            service,
            tokens,
            state,
            epoch: Mutex::new(0),
            sign_ins: AtomicU64::new(0),
            bootstrapped: AtomicBool::new(false),
        }
    }

    fn lock_epoch(&self) -> MutexGuard<'_, u64> {
        self.epoch.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Reactive view for navigation, gates and context menus.
    pub fn access_view(&self) -> AccessView {
        AccessView::new(self.subscribe())
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status
    }

    pub fn permissions(&self) -> PermissionSet {
        self.state.borrow().permissions.clone()
    }

    pub fn actor(&self) -> Option<Arc<Actor>> {
        self.state.borrow().actor.clone()
    }

    fn signed_in(&self, actor: Actor) -> Session {
        let generation = self.sign_ins.fetch_add(1, Ordering::SeqCst) + 1;
        Session::signed_in(actor, Utc::now(), generation)
    }

    fn load_token(&self) -> Option<String> {
        match self.tokens.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored credential");
                None
            }
        }
    }

    fn discard_token(&self) {
        if let Err(e) = self.tokens.clear() {
            tracing::warn!(error = %e, "could not clear stored credential");
        }
    }

    /// Resolve the stored credential into a session. Runs once per store.
    pub async fn bootstrap(&self) {
        if self.bootstrapped.swap(true, Ordering::SeqCst) {
            tracing::debug!("bootstrap already ran; ignoring");
            return;
        }

        let epoch = *self.lock_epoch();
        let Some(token) = self.load_token() else {
            tracing::info!("no stored credential; session starts signed out");
            self.publish_if_bootstrapping(epoch, Session::signed_out());
            return;
        };

        match self.service.fetch_actor(&token).await {
            Ok(actor) => {
                tracing::info!(actor = %actor.id, "session restored from stored credential");
                self.publish_if_bootstrapping(epoch, self.signed_in(actor));
            }
            Err(e) => {
                tracing::info!(error = %e, "stored credential rejected; signing out");
                let mut guard = self.lock_epoch();
                if *guard == epoch {
                    *guard += 1;
                    self.discard_token();
                    self.state.send_replace(Session::signed_out());
                }
            }
        }
    }

    fn publish_if_bootstrapping(&self, epoch: u64, next: Session) {
        let guard = self.lock_epoch();
        if *guard != epoch {
            tracing::debug!("session changed during bootstrap; result discarded");
            return;
        }
        self.state.send_if_modified(|current| {
            if current.status != SessionStatus::Bootstrapping {
                return false;
            }
            *current = next;
            true
        });
        drop(guard);
    }

    /// Exchange credentials, persist the token and load the actor.
    ///
    /// Only valid from `Unauthenticated`. Never fails with `Err`: every
    /// failure comes back as `AuthOutcome { success: false, message }` and
    /// leaves the session `Unauthenticated` with no stored token.
    pub async fn login(&self, handle: &str, secret: &str) -> AuthOutcome {
        let epoch = {
            let guard = self.lock_epoch();
            let mut refusal = None;
            self.state.send_if_modified(|current| match current.status {
                SessionStatus::Unauthenticated => {
                    current.status = SessionStatus::Authenticating;
                    true
                }
                other => {
                    refusal = Some(other);
                    false
                }
            });
            if let Some(status) = refusal {
                tracing::debug!(%status, "login refused");
                return AuthOutcome::failure(match status {
                    SessionStatus::Bootstrapping => "The session is still loading",
                    SessionStatus::Authenticating => "A sign-in is already in progress",
                    _ => "Already signed in",
                });
            }
            *guard
        };

        let token = match self.service.login(handle, secret).await {
            Ok(token) => token,
            Err(e) => return self.fail_login(epoch, &e),
        };

        let stale = {
            let guard = self.lock_epoch();
            if *guard != epoch {
                drop(guard);
                true
            } else {
                if let Err(e) = self.tokens.store(&token) {
                    tracing::warn!(error = %e, "could not persist credential");
                    self.state.send_replace(Session::signed_out());
                    return AuthOutcome::failure("Could not save the session");
                }
                drop(guard);
                false
            }
        };
        if stale {
            tracing::info!("login settled after logout; revoking credential");
            if let Err(e) = self.service.logout(&token).await {
                tracing::warn!(error = %e, "could not revoke discarded credential");
            }
            return AuthOutcome::failure(SESSION_CLOSED);
        }

        let actor = match self.service.fetch_actor(&token).await {
            Ok(actor) => actor,
            Err(e) => return self.fail_login(epoch, &e),
        };

        let guard = self.lock_epoch();
        if *guard != epoch {
            tracing::info!("login settled after logout; actor discarded");
            return AuthOutcome::failure(SESSION_CLOSED);
        }
        tracing::info!(actor = %actor.id, role = %actor.role.name, "signed in");
        self.state.send_replace(self.signed_in(actor));
        drop(guard);
        AuthOutcome::ok()
    }

    /// Roll a failed login back to `Unauthenticated`, dropping any token it stored.
    fn fail_login(&self, epoch: u64, err: &ServiceError) -> AuthOutcome {
        tracing::info!(error = %err, "login failed");
        let guard = self.lock_epoch();
        if *guard == epoch {
            self.discard_token();
            self.state.send_replace(Session::signed_out());
        }
        drop(guard);
        AuthOutcome::failure(err.user_message())
    }

    /// Clear local state unconditionally, then notify the service best-effort.
    pub async fn logout(&self) {
        let token = self.load_token();
        {
            let mut guard = self.lock_epoch();
            *guard += 1;
            self.discard_token();
            self.state.send_replace(Session::signed_out());
        }
        tracing::info!("signed out");

        let Some(token) = token else {
            return;
        };
        if let Err(e) = self.service.logout(&token).await {
            tracing::warn!(error = %e, "remote logout failed; local session already cleared");
        }
    }

    /// Re-fetch the actor and replace actor and permissions together.
    ///
    /// Only valid while `Authenticated`. A failure leaves the session as it
    /// was; a response arriving after logout is discarded.
    pub async fn refresh_permissions(&self) -> AuthOutcome {
        let epoch = {
            let guard = self.lock_epoch();
            if !self.state.borrow().is_authenticated() {
                return AuthOutcome::failure("You are not signed in");
            }
            *guard
        };
        let Some(token) = self.load_token() else {
            return AuthOutcome::failure(ServiceError::NoCredential.user_message());
        };

        let actor = match self.service.fetch_actor(&token).await {
            Ok(actor) => actor,
            Err(e) => {
                tracing::warn!(error = %e, "permission refresh failed; keeping current session");
                return AuthOutcome::failure(e.user_message());
            }
        };

        let guard = self.lock_epoch();
        if *guard != epoch {
            tracing::info!("refresh settled after logout; discarded");
            return AuthOutcome::failure(SESSION_CLOSED);
        }
        let mut applied = false;
        self.state.send_if_modified(|current| {
            if !current.is_authenticated() {
                return false;
            }
            *current = Session {
                authenticated_at: current.authenticated_at,
                ..Session::signed_in(actor, Utc::now(), current.generation)
            };
            applied = true;
            true
        });
        drop(guard);

        if applied {
            tracing::info!(permissions = self.permissions().len(), "permissions refreshed");
            AuthOutcome::ok()
        } else {
            AuthOutcome::failure(SESSION_CLOSED)
        }
    }

    /// Merge display fields into the actor locally. Permissions are untouched.
    pub fn update_user(&self, patch: &ActorPatch) {
        if patch.is_empty() {
            return;
        }
        let changed = self.state.send_if_modified(|current| match &current.actor {
            Some(actor) => {
                current.actor = Some(Arc::new(actor.merged(patch)));
                true
            }
            None => false,
        });
        if !changed {
            tracing::debug!("update_user ignored: no actor");
        }
    }

    /// Send one liveness signal with the stored credential.
    pub async fn send_heartbeat(&self) -> Result<(), ServiceError> {
        let token = self.load_token().ok_or(ServiceError::NoCredential)?;
        self.service.heartbeat(&token).await
    }
}
