//! Claims payload embedded in signed tokens.

use serde::{Deserialize, Serialize};

use keystone_entity::identity::Identity;
use keystone_entity::role::RoleSnapshot;

/// Claims payload carried by both access and refresh tokens.
///
/// One tagged shape covers both the minimal and the enriched payload: a
/// token without a role deserializes with `role: None` and is treated as a
/// guest at identity-extraction time. The enriched form is authoritative for
/// authorization, avoiding a store round-trip per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The user this token authenticates.
    pub user_id: i64,
    /// The user's email at issuance time.
    pub email: String,
    /// Role snapshot at issuance time, absent in the minimal shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleSnapshot>,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Extract the caller identity, defaulting an absent role to guest.
    pub fn into_identity(self) -> Identity {
        let role = Some(self.role.unwrap_or_else(RoleSnapshot::guest));
        Identity {
            user_id: self.user_id,
            email: self.email,
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_claims_default_to_guest_identity() {
        let json = r#"{"user_id": 42, "email": "a@b.c", "iat": 0, "exp": 10}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert!(claims.role.is_none());

        let identity = claims.into_identity();
        let role = identity.role.unwrap();
        assert_eq!(role.id, 0);
        assert_eq!(role.name, "guest");
    }

    #[test]
    fn test_enriched_claims_keep_role() {
        let json =
            r#"{"user_id": 1, "email": "a@b.c", "role": {"id": 3, "name": "editor"}, "iat": 0, "exp": 10}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.role.as_ref().unwrap().name, "editor");
    }
}
