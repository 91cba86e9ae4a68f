//! Scripted identity service and fixtures shared by the session tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use backoffice_auth::{Actor, PermissionRecord, Role};
use backoffice_core::ActorId;
use backoffice_session::{IdentityService, MemoryTokenStore, ServiceError, SessionStore};

pub const PASSWORD: &str = "s3cret";

pub fn actor(permissions: &[&str]) -> Actor {
    Actor {
        id: ActorId::from(42),
        name: "Ana Pérez".to_string(),
        username: "ana".to_string(),
        avatar: None,
        role: Role::new(
            "Administrador",
            permissions
                .iter()
                .map(|p| PermissionRecord::new(p.to_string()))
                .collect(),
        ),
    }
}

/// In-memory identity service with scripted answers.
///
/// `fetch_actor` answers with the current actor, or a 401 when none is set.
/// Every call waits `delay` first, so paused-time tests can interleave
/// operations with an in-flight request.
#[derive(Default)]
pub struct ScriptedIdentity {
    actor: Mutex<Option<Actor>>,
    delay: Duration,
    fail_logout: bool,
    fail_heartbeat: AtomicBool,
    pub fetch_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    heartbeats: Mutex<Vec<Instant>>,
}

impl ScriptedIdentity {
    pub fn new(actor: Option<Actor>) -> Self {
        Self {
            actor: Mutex::new(actor),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_logout(mut self) -> Self {
        self.fail_logout = true;
        self
    }

    pub fn set_actor(&self, actor: Option<Actor>) {
        *self.actor.lock().unwrap() = actor;
    }

    pub fn fail_heartbeats(&self, fail: bool) {
        self.fail_heartbeat.store(fail, Ordering::SeqCst);
    }

    pub fn heartbeats(&self) -> Vec<Instant> {
        self.heartbeats.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl IdentityService for ScriptedIdentity {
    async fn login(&self, handle: &str, secret: &str) -> Result<String, ServiceError> {
        self.wait().await;
        if secret == PASSWORD {
            Ok(format!("token-{handle}"))
        } else {
            Err(ServiceError::Api {
                status: 401,
                message: String::new(),
            })
        }
    }

    async fn fetch_actor(&self, _token: &str) -> Result<Actor, ServiceError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        self.actor
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ServiceError::Api {
                status: 401,
                message: "token expired".to_string(),
            })
    }

    async fn logout(&self, _token: &str) -> Result<(), ServiceError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_logout {
            return Err(ServiceError::Network("connection reset".to_string()));
        }
        Ok(())
    }

    async fn heartbeat(&self, _token: &str) -> Result<(), ServiceError> {
        self.heartbeats.lock().unwrap().push(Instant::now());
        if self.fail_heartbeat.load(Ordering::SeqCst) {
            return Err(ServiceError::Network("timed out".to_string()));
        }
        Ok(())
    }
}

pub struct Harness {
    pub identity: Arc<ScriptedIdentity>,
    pub tokens: Arc<MemoryTokenStore>,
    pub store: Arc<SessionStore>,
}

pub fn harness(identity: ScriptedIdentity, stored_token: Option<&str>) -> Harness {
    let identity = Arc::new(identity);
    let tokens = Arc::new(match stored_token {
        Some(token) => MemoryTokenStore::with_token(token),
        None => MemoryTokenStore::new(),
    });
    let store = Arc::new(SessionStore::new(identity.clone(), tokens.clone()));
    Harness {
        identity,
        tokens,
        store,
    }
}
