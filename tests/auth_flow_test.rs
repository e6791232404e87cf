//! Integration tests for the token lifecycle over HTTP.

mod helpers;

use http::StatusCode;

#[tokio::test]
async fn test_login_returns_token_pair() {
    let app = helpers::TestApp::new();
    app.create_test_user("Alice", "alice@example.com", "password123", None)
        .await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": "alice@example.com",
                "password": "password123",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"]["accessToken"].is_string());
    assert!(response.body["data"]["refreshToken"].is_string());
}

#[tokio::test]
async fn test_login_wrong_password_rejected() {
    let app = helpers::TestApp::new();
    app.create_test_user("Alice", "alice@example.com", "password123", None)
        .await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": "alice@example.com",
                "password": "wrongpassword",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_unknown_email_rejected_identically() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": "nobody@example.com",
                "password": "password123",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_refresh_rotates_and_rejects_stale_token() {
    let app = helpers::TestApp::new();
    app.create_test_user("Alice", "alice@example.com", "password123", None)
        .await;

    let login = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": "alice@example.com",
                "password": "password123",
            })),
            None,
        )
        .await;
    let first_refresh = login.body["data"]["refreshToken"].as_str().unwrap().to_string();

    let rotated = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({ "refreshToken": first_refresh })),
            None,
        )
        .await;
    assert_eq!(rotated.status, StatusCode::OK);
    assert!(rotated.body["data"]["refreshToken"].is_string());

    // The rotated-out token is no longer stored.
    let stale = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({ "refreshToken": first_refresh })),
            None,
        )
        .await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);
    assert_eq!(stale.body["error"], "INVALID_REFRESH_TOKEN");
}

#[tokio::test]
async fn test_refresh_unknown_token_rejected() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({ "refreshToken": "no-such-token" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "INVALID_REFRESH_TOKEN");
}

#[tokio::test]
async fn test_forgot_password_does_not_reveal_account_existence() {
    let app = helpers::TestApp::new();
    app.create_test_user("Alice", "alice@example.com", "password123", None)
        .await;

    let known = app
        .request(
            "POST",
            "/api/auth/forgot-password",
            Some(serde_json::json!({ "email": "alice@example.com" })),
            None,
        )
        .await;
    let unknown = app
        .request(
            "POST",
            "/api/auth/forgot-password",
            Some(serde_json::json!({ "email": "nobody@example.com" })),
            None,
        )
        .await;

    assert_eq!(known.status, StatusCode::OK);
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(known.body["data"]["message"], unknown.body["data"]["message"]);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"]["status"].is_string());
}
