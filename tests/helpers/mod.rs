//! Shared test helpers for integration tests.
//!
//! The default app runs against a `MemoryIdentityStore`, so the token and
//! access-control paths are exercised without a database. The connection
//! pool is created lazily and never touched by those paths.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use keystone_api::{AppState, build_router};
use keystone_auth::access::AccessPipeline;
use keystone_auth::password::{PasswordHasher, PasswordPolicy};
use keystone_auth::permission::PermissionResolver;
use keystone_auth::recovery::PasswordRecovery;
use keystone_auth::store::{IdentityStore, MemoryIdentityStore};
use keystone_auth::token::{TokenCodec, TokenManager};
use keystone_core::config::AppConfig;
use keystone_core::traits::TracingMailer;
use keystone_database::repositories::{PermissionRepository, RoleRepository, UserRepository};
use keystone_entity::permission::PermissionGrant;

/// Response captured from a test request.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Test application context backed by an in-memory identity store.
pub struct TestApp {
    pub router: Router,
    pub store: MemoryIdentityStore,
    pub config: AppConfig,
}

impl TestApp {
    /// Build the full router over a memory store and a lazy pool.
    pub fn new() -> Self {
        let config = AppConfig::load("test").expect("Failed to load configuration");
        let store = MemoryIdentityStore::new();

        let db_pool = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .expect("Failed to build lazy pool");

        let identity_store: Arc<dyn IdentityStore> = Arc::new(store.clone());

        let state = AppState {
            config: Arc::new(config.clone()),
            db_pool: db_pool.clone(),
            token_manager: Arc::new(TokenManager::new(&config.auth, Arc::clone(&identity_store))),
            pipeline: Arc::new(AccessPipeline::new(
                TokenCodec::new(&config.auth),
                PermissionResolver::new(Arc::clone(&identity_store)),
            )),
            recovery: Arc::new(PasswordRecovery::new(
                &config.auth,
                Arc::clone(&identity_store),
                Arc::new(TracingMailer),
            )),
            password_hasher: PasswordHasher::new(),
            password_policy: PasswordPolicy::new(&config.auth),
            user_repo: Arc::new(UserRepository::new(db_pool.clone())),
            role_repo: Arc::new(RoleRepository::new(db_pool.clone())),
            permission_repo: Arc::new(PermissionRepository::new(db_pool)),
        };

        Self {
            router: build_router(state),
            store,
            config,
        }
    }

    /// Seed a user with an optional role carrying the given grants.
    pub async fn create_test_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<(&str, Vec<(&str, &str)>)>,
    ) -> i64 {
        let role_id = match role {
            Some((role_name, grants)) => {
                let grants = grants
                    .into_iter()
                    .map(|(m, a)| PermissionGrant::new(m, a))
                    .collect();
                Some(self.store.add_role(role_name, grants).await)
            }
            None => None,
        };

        let hash = PasswordHasher::new()
            .hash_password(password)
            .expect("Failed to hash password");
        self.store.add_user(name, email, &hash, role_id).await
    }

    /// Log in through the API and return the access token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({ "email": email, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);

        response.body["data"]["accessToken"]
            .as_str()
            .expect("No access token in login response")
            .to_string()
    }

    /// Drive one request through the router.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
