//! Expired refresh token cleanup.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use keystone_core::result::AppResult;

use crate::store::IdentityStore;

/// Handles periodic deletion of expired refresh token rows.
///
/// Expired tokens are already rejected lazily on use; this sweep is table
/// hygiene, not a correctness mechanism.
#[derive(Clone)]
pub struct RefreshTokenCleanup {
    store: Arc<dyn IdentityStore>,
}

impl std::fmt::Debug for RefreshTokenCleanup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenCleanup").finish()
    }
}

impl RefreshTokenCleanup {
    /// Create a cleanup handler over the given store.
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Run one cleanup cycle; returns the number of rows removed.
    pub async fn run_cleanup(&self) -> AppResult<u64> {
        let removed = self.store.delete_expired_refresh_tokens(Utc::now()).await?;
        if removed > 0 {
            info!(removed, "expired refresh tokens removed");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryIdentityStore;
    use chrono::Duration;

    #[tokio::test]
    async fn test_cleanup_removes_only_expired_rows() {
        let store = MemoryIdentityStore::new();
        let alice = store.add_user("Alice", "a@example.com", "h", None).await;
        let bob = store.add_user("Bob", "b@example.com", "h", None).await;

        store
            .upsert_refresh_token(alice, "live", Utc::now() + Duration::days(7))
            .await
            .unwrap();
        store
            .upsert_refresh_token(bob, "dead", Utc::now() - Duration::hours(1))
            .await
            .unwrap();

        let cleanup = RefreshTokenCleanup::new(Arc::new(store.clone()));
        assert_eq!(cleanup.run_cleanup().await.unwrap(), 1);
        assert!(store.refresh_token_for(alice).await.is_some());
        assert!(store.refresh_token_for(bob).await.is_none());
    }
}
