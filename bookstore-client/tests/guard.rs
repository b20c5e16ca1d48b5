// bookstore-client/tests/guard.rs
// 路由守卫集成测试

mod common;

use std::sync::Arc;
use std::time::Duration;

use bookstore_client::{GuardState, RouteGuard};
use common::{Harness, USER_ID, envelope, failure, mount_get, user};
use serde_json::json;
use tokio::time::timeout;
use wiremock::ResponseTemplate;

fn guard_for(h: &Harness) -> RouteGuard {
    RouteGuard::new(h.services.auth.clone(), h.config.login_route.clone())
}

#[tokio::test]
async fn test_no_session_is_unauthenticated_with_origin() {
    let h = Harness::start().await;
    let guard = guard_for(&h);

    let state = guard.check("/orders").await;

    assert_eq!(
        state,
        GuardState::Unauthenticated {
            redirect_to: "/login".to_string(),
            from: "/orders".to_string(),
        }
    );
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_valid_session_adopts_refreshed_user() {
    let h = Harness::start().await;
    h.login();
    mount_get(
        &h.server,
        "/api/auth/validate",
        envelope(json!({"id": 7, "username": "reader", "name": "刷新后"})),
    )
    .await;
    let guard = guard_for(&h);

    let state = guard.check("/cart").await;

    match state {
        GuardState::Authenticated(user) => assert_eq!(user.name.as_deref(), Some("刷新后")),
        other => panic!("unexpected guard state: {:?}", other),
    }
    assert!(guard.current().is_authenticated());
}

#[tokio::test]
async fn test_unavailable_validation_trusts_local_session() {
    let h = Harness::start().await;
    h.login();
    mount_get(&h.server, "/api/auth/validate", ResponseTemplate::new(500)).await;
    let guard = guard_for(&h);

    let state = guard.check("/profile").await;

    assert_eq!(state, GuardState::Authenticated(user(USER_ID)));
    assert!(h.session.is_authenticated());
}

#[tokio::test]
async fn test_missing_validation_endpoint_trusts_local_session() {
    let h = Harness::start().await;
    h.login();
    let guard = guard_for(&h);

    assert!(guard.check("/").await.is_authenticated());
}

#[tokio::test]
async fn test_rejected_session_is_cleared() {
    let h = Harness::start().await;
    h.login();
    mount_get(&h.server, "/api/auth/validate", failure(200, "会话已过期")).await;
    let guard = guard_for(&h);

    let state = guard.check("/orders").await;

    assert!(matches!(state, GuardState::Unauthenticated { ref from, .. } if from == "/orders"));
    assert!(!h.session.is_authenticated());
}

#[tokio::test]
async fn test_watcher_rechecks_on_session_change() {
    let h = Harness::start().await;
    mount_get(
        &h.server,
        "/api/auth/validate",
        envelope(json!({"id": 7, "username": "reader"})),
    )
    .await;
    let guard = Arc::new(guard_for(&h));
    let mut rx = guard.state();

    assert!(!guard.check("/cart").await.is_authenticated());
    let watcher = guard.spawn_watcher();

    h.login();
    timeout(Duration::from_secs(5), rx.wait_for(|s| s.is_authenticated()))
        .await
        .expect("guard should re-validate")
        .unwrap();

    h.session.clear();
    timeout(
        Duration::from_secs(5),
        rx.wait_for(|s| matches!(s, GuardState::Unauthenticated { .. })),
    )
    .await
    .expect("guard should see logout")
    .unwrap();

    watcher.abort();
}

#[tokio::test]
async fn test_watcher_stops_when_guard_dropped() {
    let h = Harness::start().await;
    let guard = Arc::new(guard_for(&h));
    let watcher = guard.spawn_watcher();

    drop(guard);
    h.session.notify_external_change();

    timeout(Duration::from_secs(5), watcher)
        .await
        .expect("watcher should stop once the guard is gone")
        .unwrap();
}
