//! Role entity model and the snapshot embedded in token claims.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A named role grouping permission grants.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    /// Unique role identifier.
    pub id: i64,
    /// Role name, stored lowercase; `admin` is the wildcard role.
    pub name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// System roles cannot be modified or deleted.
    pub is_system_role: bool,
}

impl Role {
    /// Whether this role grants the administrative wildcard.
    pub fn is_admin(&self) -> bool {
        self.name.eq_ignore_ascii_case("admin")
    }
}

/// The role fields embedded in token claims.
///
/// A snapshot taken at issuance time: role renames or permission changes are
/// not reflected in already-issued tokens until the next refresh or login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSnapshot {
    /// Role identifier at issuance time.
    pub id: i64,
    /// Role name at issuance time.
    pub name: String,
}

impl RoleSnapshot {
    /// Fallback snapshot for claims that carry no role.
    pub fn guest() -> Self {
        Self {
            id: 0,
            name: "guest".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_is_case_insensitive() {
        let role = Role {
            id: 1,
            name: "ADMIN".to_string(),
            description: None,
            is_system_role: true,
        };
        assert!(role.is_admin());
    }
}
