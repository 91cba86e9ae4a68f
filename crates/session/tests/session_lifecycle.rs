//! SessionStore lifecycle: bootstrap, login, logout, refresh and their
//! interleavings.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use backoffice_auth::ActorPatch;
use backoffice_session::{SessionStatus, TokenStore};

use common::{PASSWORD, ScriptedIdentity, actor, harness};

async fn wait_for(check: impl Fn() -> bool) {
    while !check() {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn bootstrap_without_token_skips_the_network() {
    let h = harness(ScriptedIdentity::new(Some(actor(&["ventas.ver"]))), None);
    assert_eq!(h.store.status(), SessionStatus::Bootstrapping);

    h.store.bootstrap().await;

    assert_eq!(h.store.status(), SessionStatus::Unauthenticated);
    assert_eq!(h.identity.fetches(), 0);
    assert!(h.store.actor().is_none());
}

#[tokio::test]
async fn bootstrap_with_valid_token_authenticates() {
    let h = harness(
        ScriptedIdentity::new(Some(actor(&["ventas.ver", "ventas.crear"]))),
        Some("token-ana"),
    );

    h.store.bootstrap().await;

    let session = h.store.snapshot();
    assert_eq!(session.status, SessionStatus::Authenticated);
    assert!(session.authenticated_at.is_some());
    assert!(session.permissions.has("ventas.crear"));
    assert_eq!(session.actor.unwrap().username, "ana");
}

#[tokio::test]
async fn bootstrap_with_rejected_token_cleans_up() {
    let h = harness(ScriptedIdentity::new(None), Some("stale"));

    h.store.bootstrap().await;

    assert_eq!(h.store.status(), SessionStatus::Unauthenticated);
    assert_eq!(h.tokens.load().unwrap(), None);
}

#[tokio::test]
async fn bootstrap_runs_once() {
    let h = harness(ScriptedIdentity::new(Some(actor(&[]))), Some("token-ana"));

    h.store.bootstrap().await;
    h.store.logout().await;
    h.store.bootstrap().await;

    assert_eq!(h.identity.fetches(), 1);
    assert_eq!(h.store.status(), SessionStatus::Unauthenticated);
}

#[tokio::test]
async fn login_populates_actor_and_persists_token() {
    let h = harness(ScriptedIdentity::new(Some(actor(&["compras.ver"]))), None);
    h.store.bootstrap().await;

    let outcome = h.store.login("ana", PASSWORD).await;

    assert!(outcome.success, "{outcome:?}");
    assert_eq!(outcome.message, None);
    assert_eq!(h.store.status(), SessionStatus::Authenticated);
    assert!(h.store.permissions().has("compras.ver"));
    assert_eq!(h.tokens.load().unwrap().as_deref(), Some("token-ana"));
}

#[tokio::test]
async fn wrong_password_reports_failure_and_persists_nothing() {
    let h = harness(ScriptedIdentity::new(Some(actor(&[]))), None);
    h.store.bootstrap().await;

    let outcome = h.store.login("user1", "wrongpass").await;

    assert!(!outcome.success);
    assert!(!outcome.message.unwrap_or_default().trim().is_empty());
    assert_eq!(h.store.status(), SessionStatus::Unauthenticated);
    assert_eq!(h.tokens.load().unwrap(), None);
}

#[tokio::test]
async fn login_whose_actor_fetch_fails_leaves_no_token() {
    let h = harness(ScriptedIdentity::new(None), None);
    h.store.bootstrap().await;

    let outcome = h.store.login("ana", PASSWORD).await;

    assert!(!outcome.success);
    assert!(outcome.message.is_some());
    assert_eq!(h.store.status(), SessionStatus::Unauthenticated);
    assert!(h.store.permissions().is_empty());
    assert_eq!(h.tokens.load().unwrap(), None);
}

#[tokio::test]
async fn login_is_refused_outside_unauthenticated() {
    let h = harness(ScriptedIdentity::new(Some(actor(&[]))), Some("token-ana"));

    let before_bootstrap = h.store.login("ana", PASSWORD).await;
    assert!(!before_bootstrap.success);

    h.store.bootstrap().await;
    let while_signed_in = h.store.login("ana", PASSWORD).await;
    assert!(!while_signed_in.success);
    assert_eq!(h.store.status(), SessionStatus::Authenticated);
}

#[tokio::test]
async fn logout_clears_state_even_when_remote_fails() {
    let h = harness(
        ScriptedIdentity::new(Some(actor(&["all"]))).failing_logout(),
        Some("token-ana"),
    );
    h.store.bootstrap().await;
    assert!(h.store.snapshot().is_authenticated());

    h.store.logout().await;

    assert_eq!(h.identity.logout_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.store.status(), SessionStatus::Unauthenticated);
    assert!(h.store.actor().is_none());
    assert!(h.store.permissions().is_empty());
    assert_eq!(h.tokens.load().unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn logout_during_inflight_login_wins() {
    let h = harness(
        ScriptedIdentity::new(Some(actor(&["ventas.ver"]))).with_delay(Duration::from_secs(1)),
        None,
    );
    h.store.bootstrap().await;

    let store = h.store.clone();
    let login = tokio::spawn(async move { store.login("ana", PASSWORD).await });
    wait_for(|| h.store.status() == SessionStatus::Authenticating).await;

    h.store.logout().await;
    let outcome = login.await.unwrap();

    assert!(!outcome.success);
    assert_eq!(h.store.status(), SessionStatus::Unauthenticated);
    assert!(h.store.actor().is_none());
    assert_eq!(h.tokens.load().unwrap(), None);
    // No stored token at logout, so the only remote logout revokes the late token.
    assert_eq!(h.identity.logout_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn logout_during_bootstrap_discards_restored_session() {
    let h = harness(
        ScriptedIdentity::new(Some(actor(&["ventas.ver"]))).with_delay(Duration::from_secs(1)),
        Some("token-ana"),
    );

    let store = h.store.clone();
    let bootstrap = tokio::spawn(async move { store.bootstrap().await });
    wait_for(|| h.identity.fetches() == 1).await;

    h.store.logout().await;
    bootstrap.await.unwrap();

    assert_eq!(h.store.status(), SessionStatus::Unauthenticated);
    assert!(h.store.actor().is_none());
    assert!(h.store.permissions().is_empty());
    assert_eq!(h.tokens.load().unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn failed_bootstrap_after_logout_changes_nothing() {
    let h = harness(
        ScriptedIdentity::new(None).with_delay(Duration::from_secs(1)),
        Some("stale"),
    );

    let store = h.store.clone();
    let bootstrap = tokio::spawn(async move { store.bootstrap().await });
    wait_for(|| h.identity.fetches() == 1).await;

    h.store.logout().await;
    let mut sessions = h.store.subscribe();
    sessions.borrow_and_update();
    h.tokens.store("fresh").unwrap();

    bootstrap.await.unwrap();

    assert!(!sessions.has_changed().unwrap());
    assert_eq!(h.tokens.load().unwrap().as_deref(), Some("fresh"));
    assert_eq!(h.store.status(), SessionStatus::Unauthenticated);
}

#[tokio::test(start_paused = true)]
async fn refresh_settling_after_logout_is_discarded() {
    let h = harness(
        ScriptedIdentity::new(Some(actor(&["ventas.ver"]))).with_delay(Duration::from_secs(1)),
        Some("token-ana"),
    );
    h.store.bootstrap().await;
    assert!(h.store.snapshot().is_authenticated());

    let store = h.store.clone();
    let refresh = tokio::spawn(async move { store.refresh_permissions().await });
    wait_for(|| h.identity.fetches() == 2).await;

    h.store.logout().await;
    let outcome = refresh.await.unwrap();

    assert!(!outcome.success);
    assert_eq!(h.store.status(), SessionStatus::Unauthenticated);
    assert!(h.store.actor().is_none());
    assert!(h.store.permissions().is_empty());
}

#[tokio::test]
async fn refresh_replaces_permissions_and_keeps_sign_in_time() {
    let h = harness(ScriptedIdentity::new(Some(actor(&["ventas.ver"]))), Some("token-ana"));
    h.store.bootstrap().await;
    let signed_in_at = h.store.snapshot().authenticated_at;

    h.identity.set_actor(Some(actor(&["ventas.ver", "ventas.anular"])));
    let outcome = h.store.refresh_permissions().await;

    assert!(outcome.success);
    let session = h.store.snapshot();
    assert!(session.is_authenticated());
    assert!(session.permissions.has("ventas.anular"));
    assert_eq!(session.authenticated_at, signed_in_at);
}

#[tokio::test]
async fn every_sign_in_gets_a_new_generation() {
    let h = harness(ScriptedIdentity::new(Some(actor(&["ventas.ver"]))), Some("token-ana"));
    assert_eq!(h.store.snapshot().generation, 0);

    h.store.bootstrap().await;
    let first = h.store.snapshot().generation;
    assert!(first > 0);

    assert!(h.store.refresh_permissions().await.success);
    assert_eq!(h.store.snapshot().generation, first);

    h.store.logout().await;
    assert_eq!(h.store.snapshot().generation, 0);

    assert!(h.store.login("ana", PASSWORD).await.success);
    assert!(h.store.snapshot().generation > first);
}

#[tokio::test]
async fn refresh_failure_keeps_existing_access() {
    let h = harness(ScriptedIdentity::new(Some(actor(&["ventas.ver"]))), Some("token-ana"));
    h.store.bootstrap().await;
    let before = h.store.snapshot();

    h.identity.set_actor(None);
    let outcome = h.store.refresh_permissions().await;

    assert!(!outcome.success);
    assert!(outcome.message.is_some());
    assert_eq!(h.store.snapshot(), before);
}

#[tokio::test]
async fn refresh_requires_an_authenticated_session() {
    let h = harness(ScriptedIdentity::new(Some(actor(&[]))), None);
    h.store.bootstrap().await;

    assert!(!h.store.refresh_permissions().await.success);
    assert_eq!(h.identity.fetches(), 0);
}

#[tokio::test]
async fn update_user_merges_locally_without_touching_permissions() {
    let h = harness(ScriptedIdentity::new(Some(actor(&["ventas.ver"]))), Some("token-ana"));
    h.store.bootstrap().await;
    let permissions = h.store.permissions();

    h.store.update_user(&ActorPatch {
        name: Some("Ana P.".to_string()),
        avatar: Some(Some("avatars/ana.png".to_string())),
        ..ActorPatch::default()
    });

    let actor = h.store.actor().unwrap();
    assert_eq!(actor.name, "Ana P.");
    assert_eq!(actor.avatar.as_deref(), Some("avatars/ana.png"));
    assert_eq!(actor.username, "ana");
    assert_eq!(h.store.permissions(), permissions);
    assert_eq!(h.identity.fetches(), 1);
}

#[tokio::test]
async fn subscribers_see_every_transition() {
    let h = harness(ScriptedIdentity::new(Some(actor(&[]))), None);
    let mut sessions = h.store.subscribe();
    assert_eq!(sessions.borrow_and_update().status, SessionStatus::Bootstrapping);

    h.store.bootstrap().await;
    assert!(sessions.has_changed().unwrap());
    assert_eq!(sessions.borrow_and_update().status, SessionStatus::Unauthenticated);

    h.store.login("ana", PASSWORD).await;
    assert_eq!(sessions.borrow_and_update().status, SessionStatus::Authenticated);
}
