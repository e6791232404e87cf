//! Resolves a user's effective permission set from role and direct grants.

use std::sync::Arc;

use keystone_core::error::AppError;
use keystone_core::result::AppResult;
use keystone_entity::permission::PermissionSet;

use crate::store::IdentityStore;

/// Merges role-level and user-level grants into one deduplicated set,
/// applying the administrative wildcard shortcut.
#[derive(Clone)]
pub struct PermissionResolver {
    store: Arc<dyn IdentityStore>,
}

impl std::fmt::Debug for PermissionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionResolver").finish()
    }
}

impl PermissionResolver {
    /// Create a resolver over the given store.
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Compute the effective permission set for a user.
    ///
    /// A role named `admin` (any casing) short-circuits to the singleton
    /// `*:*` wildcard regardless of other grants. Otherwise the result is
    /// the union of role grants and direct grants, deduplicated by the
    /// `module:action` key. Store failures propagate — never defaults to
    /// an open set.
    pub async fn resolve_effective_permissions(&self, user_id: i64) -> AppResult<PermissionSet> {
        let snapshot = self
            .store
            .load_authorization_snapshot(user_id)
            .await?
            .ok_or_else(|| AppError::user_not_found(format!("No user with id {user_id}")))?;

        if snapshot
            .role
            .as_ref()
            .is_some_and(|r| r.name.eq_ignore_ascii_case("admin"))
        {
            return Ok(PermissionSet::admin_wildcard());
        }

        Ok(PermissionSet::from_grants(
            snapshot
                .role_grants
                .into_iter()
                .chain(snapshot.direct_grants),
        ))
    }

    /// Whether the user's effective set satisfies `module:action`.
    pub async fn user_has_permission(
        &self,
        user_id: i64,
        module: &str,
        action: &str,
    ) -> AppResult<bool> {
        let set = self.resolve_effective_permissions(user_id).await?;
        Ok(set.has_permission(module, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryIdentityStore;
    use keystone_core::error::ErrorKind;
    use keystone_entity::permission::PermissionGrant;

    #[tokio::test]
    async fn test_admin_role_collapses_to_wildcard_regardless_of_grants() {
        let store = MemoryIdentityStore::new();
        let role_id = store
            .add_role("ADMIN", vec![PermissionGrant::new("user", "view")])
            .await;
        let user_id = store.add_user("Root", "root@example.com", "h", Some(role_id)).await;
        store
            .grant_direct(user_id, PermissionGrant::new("role", "delete"))
            .await;

        let resolver = PermissionResolver::new(Arc::new(store));
        let set = resolver.resolve_effective_permissions(user_id).await.unwrap();

        assert_eq!(set.grants(), &[PermissionGrant::wildcard()]);
        assert!(set.has_permission("anything", "at-all"));
    }

    #[tokio::test]
    async fn test_role_and_direct_grants_union_deduplicated() {
        let store = MemoryIdentityStore::new();
        let role_id = store
            .add_role(
                "editor",
                vec![
                    PermissionGrant::new("user", "view"),
                    PermissionGrant::new("role", "view"),
                ],
            )
            .await;
        let user_id = store.add_user("E", "e@example.com", "h", Some(role_id)).await;
        // Identical to a role grant: must collapse into one entry.
        store
            .grant_direct(user_id, PermissionGrant::new("role", "view"))
            .await;
        store
            .grant_direct(user_id, PermissionGrant::new("user", "update"))
            .await;

        let resolver = PermissionResolver::new(Arc::new(store));
        let set = resolver.resolve_effective_permissions(user_id).await.unwrap();

        assert_eq!(set.len(), 3);
        assert!(set.has_permission("user", "view"));
        assert!(set.has_permission("role", "view"));
        assert!(set.has_permission("user", "update"));
        assert!(!set.has_permission("user", "delete"));
    }

    #[tokio::test]
    async fn test_partial_wildcard_grant_is_scoped_to_its_module() {
        let store = MemoryIdentityStore::new();
        let user_id = store.add_user("W", "w@example.com", "h", None).await;
        store
            .grant_direct(user_id, PermissionGrant::new("user", "*"))
            .await;

        let resolver = PermissionResolver::new(Arc::new(store));
        let set = resolver.resolve_effective_permissions(user_id).await.unwrap();

        assert!(set.has_permission("user", "delete"));
        assert!(!set.has_permission("role", "delete"));
    }

    #[tokio::test]
    async fn test_unknown_user_fails_with_user_not_found() {
        let resolver = PermissionResolver::new(Arc::new(MemoryIdentityStore::new()));
        let err = resolver.resolve_effective_permissions(999).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UserNotFound);
    }
}
