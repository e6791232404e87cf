//! Refresh token persistence model and the issued token pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored refresh token.
///
/// At most one row exists per user: issuing a new refresh token overwrites
/// any prior one through an upsert keyed on `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshTokenRecord {
    /// Row identifier.
    pub id: i64,
    /// Owning user; unique.
    pub user_id: i64,
    /// The signed refresh token value.
    pub token: String,
    /// When the record stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Whether the record has expired at the given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// An access/refresh token pair returned by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived signed credential for request authentication.
    pub access_token: String,
    /// Longer-lived signed credential used solely to obtain a new pair.
    pub refresh_token: String,
}
