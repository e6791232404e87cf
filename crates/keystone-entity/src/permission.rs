//! Permission entities and the effective permission set.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The wildcard segment matching any module or action.
pub const WILDCARD: &str = "*";

/// A permission catalog row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Permission {
    /// Unique permission identifier.
    pub id: i64,
    /// Module segment (e.g. `user`, `role`).
    pub module: String,
    /// Action segment (e.g. `view`, `create`, `update`, `delete`).
    pub action: String,
    /// Decorative description, not part of the identity key.
    pub description: Option<String>,
}

/// A `{module, action}` grant. Identity key is `module:action`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct PermissionGrant {
    /// Module segment; `*` matches any module.
    pub module: String,
    /// Action segment; `*` matches any action.
    pub action: String,
}

impl PermissionGrant {
    /// Build a grant from its two segments.
    pub fn new(module: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            action: action.into(),
        }
    }

    /// The administrative wildcard grant `*:*`.
    pub fn wildcard() -> Self {
        Self::new(WILDCARD, WILDCARD)
    }

    /// The `module:action` identity key.
    pub fn key(&self) -> String {
        format!("{}:{}", self.module, self.action)
    }

    /// Whether this grant satisfies the given module/action.
    ///
    /// Each segment matches on equality or on a `*` in the grant, so partial
    /// wildcards like `user:*` are legal and satisfy `user:delete`.
    pub fn matches(&self, module: &str, action: &str) -> bool {
        (self.module == module || self.module == WILDCARD)
            && (self.action == action || self.action == WILDCARD)
    }
}

impl fmt::Display for PermissionGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.action)
    }
}

/// A user's resolved effective permission set.
///
/// Either the singleton `*:*` wildcard (admin role) or the deduplicated
/// union of role-granted and directly-granted permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    grants: Vec<PermissionGrant>,
}

impl PermissionSet {
    /// The singleton administrative wildcard set.
    pub fn admin_wildcard() -> Self {
        Self {
            grants: vec![PermissionGrant::wildcard()],
        }
    }

    /// Deduplicate grants by their `module:action` key, preserving order.
    pub fn from_grants(grants: impl IntoIterator<Item = PermissionGrant>) -> Self {
        let mut seen = HashSet::new();
        let grants = grants
            .into_iter()
            .filter(|g| seen.insert(g.key()))
            .collect();
        Self { grants }
    }

    /// Whether any grant in the set satisfies `module:action`.
    pub fn has_permission(&self, module: &str, action: &str) -> bool {
        self.grants.iter().any(|g| g.matches(module, action))
    }

    /// The contained grants.
    pub fn grants(&self) -> &[PermissionGrant] {
        &self.grants
    }

    /// Number of distinct grants.
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

/// Everything needed to resolve a user's effective permissions, loaded from
/// the identity store in a single read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationSnapshot {
    /// The user's identifier.
    pub user_id: i64,
    /// The user's email.
    pub email: String,
    /// The user's role, if any.
    pub role: Option<crate::role::RoleSnapshot>,
    /// Grants attached to the role.
    pub role_grants: Vec<PermissionGrant>,
    /// Grants attached directly to the user.
    pub direct_grants: Vec<PermissionGrant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_key() {
        assert_eq!(PermissionGrant::new("user", "view").key(), "user:view");
    }

    #[test]
    fn test_partial_wildcard_matches_within_module_only() {
        let grant = PermissionGrant::new("user", WILDCARD);
        assert!(grant.matches("user", "delete"));
        assert!(!grant.matches("role", "delete"));
    }

    #[test]
    fn test_full_wildcard_matches_everything() {
        let grant = PermissionGrant::wildcard();
        assert!(grant.matches("user", "view"));
        assert!(grant.matches("anything", "else"));
    }

    #[test]
    fn test_from_grants_deduplicates_by_key() {
        let set = PermissionSet::from_grants([
            PermissionGrant::new("user", "view"),
            PermissionGrant::new("role", "view"),
            PermissionGrant::new("user", "view"),
        ]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_has_permission_requires_both_segments() {
        let set = PermissionSet::from_grants([PermissionGrant::new("user", "view")]);
        assert!(set.has_permission("user", "view"));
        assert!(!set.has_permission("user", "delete"));
        assert!(!set.has_permission("role", "view"));
    }
}
