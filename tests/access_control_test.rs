//! Integration tests for the access decision pipeline over HTTP.

mod helpers;

use http::StatusCode;

#[tokio::test]
async fn test_guarded_route_without_token_rejected() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/users", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "NO_TOKEN_PROVIDED");
    // The rejection happens before any identity store access.
    assert_eq!(app.store.read_count(), 0);
}

#[tokio::test]
async fn test_guarded_route_with_garbage_token_rejected() {
    let app = helpers::TestApp::new();

    let response = app
        .request("GET", "/api/users", None, Some("not.a.token"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_expired_token_rejected_with_distinct_code() {
    let app = helpers::TestApp::new();
    app.create_test_user("Alice", "alice@example.com", "password123", None)
        .await;

    // Sign with a negative TTL: the embedded expiry is already in the past.
    let codec = keystone_auth::token::TokenCodec::new(&app.config.auth);
    let identity = keystone_entity::identity::Identity {
        user_id: 1,
        email: "alice@example.com".to_string(),
        role: None,
    };
    let expired = codec.sign(&identity, chrono::Duration::days(-1)).unwrap();

    let response = app.request("GET", "/api/users", None, Some(&expired)).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "EXPIRED_TOKEN");
}

#[tokio::test]
async fn test_missing_permission_rejected_with_403() {
    let app = helpers::TestApp::new();
    // Editor holds user:view only; the roles listing needs role:view.
    app.create_test_user(
        "Alice",
        "alice@example.com",
        "password123",
        Some(("editor", vec![("user", "view")])),
    )
    .await;
    let token = app.login("alice@example.com", "password123").await;

    let response = app.request("GET", "/api/roles", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_authenticated_route_accepts_any_valid_token() {
    let app = helpers::TestApp::new();
    let user_id = app
        .create_test_user("Alice", "alice@example.com", "password123", None)
        .await;
    let token = app.login("alice@example.com", "password123").await;

    // /auth/me requires authentication only. The handler then reads the
    // user from Postgres, which this store-only setup cannot reach, so a
    // handler-level failure is expected; the assertion is that the
    // pipeline did not reject the request.
    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;

    assert_ne!(response.status, StatusCode::UNAUTHORIZED);
    assert_ne!(response.status, StatusCode::FORBIDDEN);
    assert!(user_id > 0);
}

#[tokio::test]
async fn test_admin_role_passes_any_permission_gate() {
    let app = helpers::TestApp::new();
    app.create_test_user(
        "Root",
        "root@example.com",
        "password123",
        Some(("admin", vec![])),
    )
    .await;
    let token = app.login("root@example.com", "password123").await;

    // The wildcard passes the role:delete gate. The handler then needs
    // Postgres and fails in this store-only setup; the assertion is only
    // that the gate let the request through.
    let response = app
        .request("DELETE", "/api/roles/999", None, Some(&token))
        .await;

    assert_ne!(response.status, StatusCode::UNAUTHORIZED);
    assert_ne!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_public_routes_skip_the_pipeline_entirely() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.store.read_count(), 0);
}
