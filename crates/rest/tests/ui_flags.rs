//! Integration tests for the session UI flags endpoint.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{Value, json};
use tracekeep_rest::permissions::MANAGE_BATCHES;
use tracekeep_rest::{AppState, GrantedPermissions, ServerConfig, SessionPermissions};

use common::{Session, create_backend, server_for_state};

async fn flags(server: &axum_test::TestServer) -> Value {
    let response = server.get("/session/ui-flags").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json()
}

fn state() -> AppState<tracekeep_persistence::backends::sqlite::SqliteBackend> {
    let config = ServerConfig::for_testing();
    AppState::new(create_backend(&config), config)
}

#[tokio::test]
async fn test_anonymous_session_is_not_operator() {
    let server = server_for_state(state(), Session::anonymous());

    assert_eq!(flags(&server).await, json!({ "is_facility_operator": false }));
}

#[tokio::test]
async fn test_batch_manager_is_not_operator() {
    let manager = GrantedPermissions::new("user:1").grant(MANAGE_BATCHES);
    let session = Session::tenant(7).with_permissions(SessionPermissions::new(manager));
    let server = server_for_state(state(), session);

    assert_eq!(flags(&server).await["is_facility_operator"], false);
}

#[tokio::test]
async fn test_user_without_manage_batches_is_operator() {
    let operator = GrantedPermissions::new("user:2").grant("record-events");
    let session = Session::tenant(7).with_permissions(SessionPermissions::new(operator));
    let server = server_for_state(state(), session);

    assert_eq!(flags(&server).await["is_facility_operator"], true);
}

#[tokio::test]
async fn test_derivation_is_memoized_per_permission_source() {
    let state = state();

    // First answer for user:3 at revision 0 is cached.
    let before = GrantedPermissions::new("user:3");
    let server = server_for_state(
        state.clone(),
        Session::tenant(7).with_permissions(SessionPermissions::new(before)),
    );
    assert_eq!(flags(&server).await["is_facility_operator"], true);

    // A new capability object with the same identity reuses it.
    let same_identity = GrantedPermissions::new("user:3").grant(MANAGE_BATCHES);
    let server = server_for_state(
        state.clone(),
        Session::tenant(7).with_permissions(SessionPermissions(Arc::new(same_identity))),
    );
    assert_eq!(flags(&server).await["is_facility_operator"], true);

    // A new revision is a different identity and is recomputed.
    let regranted = GrantedPermissions::new("user:3")
        .with_revision(1)
        .grant(MANAGE_BATCHES);
    let server = server_for_state(
        state.clone(),
        Session::tenant(7).with_permissions(SessionPermissions::new(regranted)),
    );
    assert_eq!(flags(&server).await["is_facility_operator"], false);

    assert_eq!(state.operator_memo().len(), 2);
}
