//! The authenticated caller identity.

use serde::{Deserialize, Serialize};

use crate::role::RoleSnapshot;

/// Identity produced by a successful authentication.
///
/// Embedded in signed token claims and attached to the request context;
/// never persisted outside the token itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// The authenticated user's identifier.
    pub user_id: i64,
    /// The authenticated user's email.
    pub email: String,
    /// Role snapshot taken at token issuance, if any.
    pub role: Option<RoleSnapshot>,
}

impl Identity {
    /// The role snapshot, defaulting to guest when the claims carried none.
    pub fn role_or_guest(&self) -> RoleSnapshot {
        self.role.clone().unwrap_or_else(RoleSnapshot::guest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_identity_defaults_to_guest() {
        let identity = Identity {
            user_id: 7,
            email: "someone@example.com".to_string(),
            role: None,
        };
        let role = identity.role_or_guest();
        assert_eq!(role.id, 0);
        assert_eq!(role.name, "guest");
    }
}
