//! The two-stage access decision pipeline: authentication, then
//! authorization. Transport-agnostic; the HTTP layer only extracts the
//! `Authorization` header value and hands it here.

use tracing::debug;

use keystone_core::error::AppError;
use keystone_core::result::AppResult;
use keystone_entity::identity::Identity;

use crate::permission::PermissionResolver;
use crate::token::TokenCodec;

use super::policy::RoutePolicy;

/// Outcome of running the pipeline for one request.
#[derive(Debug, Clone)]
pub enum AccessDecision {
    /// Public route; neither stage ran.
    PublicBypass,
    /// Both stages passed; the identity is attached to the request.
    Allowed(Identity),
}

/// Gates every inbound request before it reaches a handler.
///
/// Authentication always precedes authorization; a rejected stage is
/// terminal for the request, with no retry and no compensating action.
#[derive(Clone)]
pub struct AccessPipeline {
    codec: TokenCodec,
    resolver: PermissionResolver,
}

impl std::fmt::Debug for AccessPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessPipeline").finish()
    }
}

impl AccessPipeline {
    /// Create a pipeline from a verifying codec and a permission resolver.
    pub fn new(codec: TokenCodec, resolver: PermissionResolver) -> Self {
        Self { codec, resolver }
    }

    /// Run both stages for a request against the route's policy.
    ///
    /// The public flag is checked first and short-circuits both stages.
    pub async fn check(
        &self,
        authorization: Option<&str>,
        policy: &RoutePolicy,
    ) -> AppResult<AccessDecision> {
        if policy.public {
            debug!("public route, access checks bypassed");
            return Ok(AccessDecision::PublicBypass);
        }

        let identity = self.authenticate(authorization)?;
        self.authorize(Some(&identity), policy).await?;
        Ok(AccessDecision::Allowed(identity))
    }

    /// Authentication stage: bearer token presence and validity.
    ///
    /// The header is split on the first space (`"Bearer <token>"`); a
    /// missing header or missing token segment rejects with
    /// `NoTokenProvided` before any store access. Codec failures surface
    /// as `InvalidToken`/`ExpiredToken`.
    pub fn authenticate(&self, authorization: Option<&str>) -> AppResult<Identity> {
        let header = authorization
            .ok_or_else(|| AppError::no_token_provided("No token provided"))?;

        let token = match header.split_once(' ') {
            Some((_, token)) if !token.is_empty() => token,
            _ => return Err(AppError::no_token_provided("No token provided")),
        };

        let claims = self.codec.verify(token)?;
        Ok(claims.into_identity())
    }

    /// Authorization stage: the route's required permissions against the
    /// caller's resolved effective permissions.
    ///
    /// Every required permission must match (logical AND). The identity
    /// argument is `Option` as a defensive check for a mis-ordered
    /// pipeline; it rejects with `NotAuthenticated` when absent.
    pub async fn authorize(
        &self,
        identity: Option<&Identity>,
        policy: &RoutePolicy,
    ) -> AppResult<()> {
        if policy.required.is_empty() {
            return Ok(());
        }

        let identity = identity
            .ok_or_else(|| AppError::not_authenticated("User not authenticated"))?;

        let effective = self
            .resolver
            .resolve_effective_permissions(identity.user_id)
            .await?;

        for required in &policy.required {
            if !effective.has_permission(&required.module, &required.action) {
                debug!(
                    user_id = identity.user_id,
                    missing = %format!("{}:{}", required.module, required.action),
                    "authorization denied"
                );
                return Err(AppError::forbidden(
                    "User does not have required permissions",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::policy::RequiredPermission;
    use crate::store::MemoryIdentityStore;
    use keystone_core::error::ErrorKind;
    use keystone_entity::permission::PermissionGrant;
    use keystone_entity::role::RoleSnapshot;
    use std::sync::Arc;

    const SECRET: &str = "pipeline-test-secret";

    fn pipeline(store: MemoryIdentityStore) -> AccessPipeline {
        let codec = TokenCodec::from_secret(SECRET);
        let resolver = PermissionResolver::new(Arc::new(store));
        AccessPipeline::new(codec, resolver)
    }

    fn bearer(codec: &TokenCodec, identity: &Identity) -> String {
        let token = codec.sign(identity, chrono::Duration::hours(1)).unwrap();
        format!("Bearer {token}")
    }

    async fn editor_store() -> (MemoryIdentityStore, Identity) {
        // alice@example.com, role `editor` granting user:view, plus a
        // direct role:view grant.
        let store = MemoryIdentityStore::new();
        let role_id = store
            .add_role("editor", vec![PermissionGrant::new("user", "view")])
            .await;
        let user_id = store
            .add_user("Alice", "alice@example.com", "h", Some(role_id))
            .await;
        store
            .grant_direct(user_id, PermissionGrant::new("role", "view"))
            .await;

        let identity = Identity {
            user_id,
            email: "alice@example.com".to_string(),
            role: Some(RoleSnapshot {
                id: role_id,
                name: "editor".to_string(),
            }),
        };
        (store, identity)
    }

    #[tokio::test]
    async fn test_public_route_bypasses_both_stages_without_header() {
        let store = MemoryIdentityStore::new();
        let pipeline = pipeline(store.clone());

        let decision = pipeline.check(None, &RoutePolicy::public()).await.unwrap();
        assert!(matches!(decision, AccessDecision::PublicBypass));
        assert_eq!(store.read_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_header_rejected_before_any_store_access() {
        let (store, _) = editor_store().await;
        let pipeline = pipeline(store.clone());
        let policy = RoutePolicy::require([RequiredPermission::new("user", "view")]);

        let err = pipeline.check(None, &policy).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoTokenProvided);
        assert_eq!(store.read_count(), 0);
    }

    #[tokio::test]
    async fn test_header_without_token_segment_rejected() {
        let (store, _) = editor_store().await;
        let pipeline = pipeline(store);

        let err = pipeline.authenticate(Some("Bearer")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoTokenProvided);
        let err = pipeline.authenticate(Some("Bearer ")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoTokenProvided);
    }

    #[tokio::test]
    async fn test_tampered_token_rejected() {
        let (store, identity) = editor_store().await;
        let pipeline = pipeline(store);
        let foreign = TokenCodec::from_secret("some-other-secret");

        let header = bearer(&foreign, &identity);
        let err = pipeline.authenticate(Some(&header)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidToken);
    }

    #[tokio::test]
    async fn test_route_without_requirements_allows_any_authenticated_caller() {
        let (store, identity) = editor_store().await;
        let pipeline = pipeline(store);
        let codec = TokenCodec::from_secret(SECRET);

        let header = bearer(&codec, &identity);
        let decision = pipeline
            .check(Some(&header), &RoutePolicy::authenticated())
            .await
            .unwrap();
        assert!(matches!(decision, AccessDecision::Allowed(_)));
    }

    #[tokio::test]
    async fn test_all_required_permissions_present_allows() {
        let (store, identity) = editor_store().await;
        let pipeline = pipeline(store);
        let codec = TokenCodec::from_secret(SECRET);
        let policy = RoutePolicy::require([
            RequiredPermission::new("user", "view"),
            RequiredPermission::new("role", "view"),
        ]);

        let header = bearer(&codec, &identity);
        let decision = pipeline.check(Some(&header), &policy).await.unwrap();
        assert!(matches!(decision, AccessDecision::Allowed(_)));
    }

    #[tokio::test]
    async fn test_and_semantics_denies_when_one_permission_missing() {
        let (store, identity) = editor_store().await;
        let pipeline = pipeline(store);
        let codec = TokenCodec::from_secret(SECRET);
        // alice holds user:view but not user:delete.
        let policy = RoutePolicy::require([RequiredPermission::new("user", "delete")]);

        let header = bearer(&codec, &identity);
        let err = pipeline.check(Some(&header), &policy).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let policy = RoutePolicy::require([
            RequiredPermission::new("user", "view"),
            RequiredPermission::new("user", "delete"),
        ]);
        let err = pipeline.check(Some(&header), &policy).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_authorize_without_identity_is_not_authenticated() {
        let (store, _) = editor_store().await;
        let pipeline = pipeline(store);
        let policy = RoutePolicy::require([RequiredPermission::new("user", "view")]);

        let err = pipeline.authorize(None, &policy).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotAuthenticated);
    }

    /// Store whose every read fails, standing in for a lost connection.
    struct FailingStore;

    #[async_trait::async_trait]
    impl crate::store::IdentityStore for FailingStore {
        async fn find_user_by_email(
            &self,
            _email: &str,
        ) -> AppResult<Option<keystone_entity::user::User>> {
            Err(AppError::database("connection refused"))
        }

        async fn load_authorization_snapshot(
            &self,
            _user_id: i64,
        ) -> AppResult<Option<keystone_entity::permission::AuthorizationSnapshot>> {
            Err(AppError::database("connection refused"))
        }

        async fn find_role_by_id(
            &self,
            _role_id: i64,
        ) -> AppResult<Option<keystone_entity::role::Role>> {
            Err(AppError::database("connection refused"))
        }

        async fn find_refresh_token(
            &self,
            _token: &str,
        ) -> AppResult<Option<keystone_entity::token::RefreshTokenRecord>> {
            Err(AppError::database("connection refused"))
        }

        async fn upsert_refresh_token(
            &self,
            _user_id: i64,
            _token: &str,
            _expires_at: chrono::DateTime<chrono::Utc>,
        ) -> AppResult<()> {
            Err(AppError::database("connection refused"))
        }

        async fn delete_expired_refresh_tokens(
            &self,
            _now: chrono::DateTime<chrono::Utc>,
        ) -> AppResult<u64> {
            Err(AppError::database("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_store_failure_during_authorization_fails_closed() {
        let codec = TokenCodec::from_secret(SECRET);
        let resolver = PermissionResolver::new(Arc::new(FailingStore));
        let pipeline = AccessPipeline::new(codec.clone(), resolver);
        let policy = RoutePolicy::require([RequiredPermission::new("user", "view")]);

        let identity = Identity {
            user_id: 1,
            email: "alice@example.com".to_string(),
            role: Some(RoleSnapshot {
                id: 1,
                name: "editor".to_string(),
            }),
        };

        // The store error surfaces as a rejection, never an allow.
        let err = pipeline
            .authorize(Some(&identity), &policy)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);

        let header = bearer(&codec, &identity);
        let err = pipeline.check(Some(&header), &policy).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);
    }

    #[tokio::test]
    async fn test_admin_wildcard_satisfies_any_requirement() {
        let store = MemoryIdentityStore::new();
        let role_id = store.add_role("Admin", vec![]).await;
        let user_id = store
            .add_user("Root", "root@example.com", "h", Some(role_id))
            .await;
        let identity = Identity {
            user_id,
            email: "root@example.com".to_string(),
            role: Some(RoleSnapshot {
                id: role_id,
                name: "admin".to_string(),
            }),
        };

        let pipeline = pipeline(store);
        let codec = TokenCodec::from_secret(SECRET);
        let policy = RoutePolicy::require([
            RequiredPermission::new("user", "delete"),
            RequiredPermission::new("role", "delete"),
        ]);

        let header = bearer(&codec, &identity);
        let decision = pipeline.check(Some(&header), &policy).await.unwrap();
        assert!(matches!(decision, AccessDecision::Allowed(_)));
    }
}
