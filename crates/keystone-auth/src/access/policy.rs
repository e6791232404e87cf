//! Per-route access metadata, resolved once at router construction.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use keystone_core::error::AppError;

/// A permission a route requires, in `module:action` form.
///
/// Both segments are opaque to the pipeline; matching against wildcard
/// grants happens in the effective permission set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredPermission {
    /// Required module segment.
    pub module: String,
    /// Required action segment.
    pub action: String,
}

impl RequiredPermission {
    /// Build a required permission from its two segments.
    pub fn new(module: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            action: action.into(),
        }
    }
}

impl FromStr for RequiredPermission {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((module, action)) if !module.is_empty() && !action.is_empty() => {
                Ok(Self::new(module, action))
            }
            _ => Err(AppError::validation(format!(
                "Invalid permission string '{s}': expected 'module:action'"
            ))),
        }
    }
}

/// Access metadata attached to a route at build time.
///
/// A public route bypasses both pipeline stages; otherwise the caller must
/// authenticate and hold every required permission.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    /// Bypass authentication and authorization entirely.
    pub public: bool,
    /// Permissions the caller must all hold (logical AND).
    pub required: Vec<RequiredPermission>,
}

impl RoutePolicy {
    /// A route exempt from both stages.
    pub fn public() -> Self {
        Self {
            public: true,
            required: Vec::new(),
        }
    }

    /// A route requiring authentication but no specific permission.
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// A route requiring authentication plus every listed permission.
    pub fn require(permissions: impl IntoIterator<Item = RequiredPermission>) -> Self {
        Self {
            public: false,
            required: permissions.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_required_permission() {
        let perm: RequiredPermission = "user:view".parse().unwrap();
        assert_eq!(perm.module, "user");
        assert_eq!(perm.action, "view");
    }

    #[test]
    fn test_parse_rejects_missing_separator_or_segment() {
        assert!("userview".parse::<RequiredPermission>().is_err());
        assert!("user:".parse::<RequiredPermission>().is_err());
        assert!(":view".parse::<RequiredPermission>().is_err());
    }

    #[test]
    fn test_public_policy_has_no_requirements() {
        let policy = RoutePolicy::public();
        assert!(policy.public);
        assert!(policy.required.is_empty());
    }
}
