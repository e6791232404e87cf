//! Unified application error types for Keystone.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Access-control rejections carry a
//! dedicated [`ErrorKind`] each, so the transport layer can tell "log in
//! again" apart from "insufficient rights" without parsing messages.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Login failed: unknown email or wrong password.
    InvalidCredentials,
    /// No bearer token was supplied on a protected route.
    NoTokenProvided,
    /// The bearer token is malformed or its signature does not match.
    InvalidToken,
    /// The bearer token's embedded expiry has passed.
    ExpiredToken,
    /// The presented refresh token matches no stored record.
    InvalidRefreshToken,
    /// The stored refresh token record has expired.
    ExpiredRefreshToken,
    /// Authorization ran without an authenticated identity attached.
    NotAuthenticated,
    /// The caller lacks a required permission.
    Forbidden,
    /// Permission resolution found no such user.
    UserNotFound,
    /// The requested resource was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (duplicate entry, concurrent modification, etc.).
    Conflict,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// An internal server error occurred.
    Internal,
}

impl ErrorKind {
    /// Whether this kind is an authentication-stage rejection (HTTP 401 class).
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::NoTokenProvided
                | Self::InvalidToken
                | Self::ExpiredToken
                | Self::InvalidRefreshToken
                | Self::ExpiredRefreshToken
                | Self::NotAuthenticated
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            Self::NoTokenProvided => write!(f, "NO_TOKEN_PROVIDED"),
            Self::InvalidToken => write!(f, "INVALID_TOKEN"),
            Self::ExpiredToken => write!(f, "EXPIRED_TOKEN"),
            Self::InvalidRefreshToken => write!(f, "INVALID_REFRESH_TOKEN"),
            Self::ExpiredRefreshToken => write!(f, "EXPIRED_REFRESH_TOKEN"),
            Self::NotAuthenticated => write!(f, "NOT_AUTHENTICATED"),
            Self::Forbidden => write!(f, "FORBIDDEN"),
            Self::UserNotFound => write!(f, "USER_NOT_FOUND"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Keystone.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-credentials error.
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCredentials, message)
    }

    /// Create a no-token-provided error.
    pub fn no_token_provided(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoTokenProvided, message)
    }

    /// Create an invalid-token error.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidToken, message)
    }

    /// Create an expired-token error.
    pub fn expired_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExpiredToken, message)
    }

    /// Create an invalid-refresh-token error.
    pub fn invalid_refresh_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRefreshToken, message)
    }

    /// Create an expired-refresh-token error.
    pub fn expired_refresh_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExpiredRefreshToken, message)
    }

    /// Create a not-authenticated error.
    pub fn not_authenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAuthenticated, message)
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Create a user-not-found error.
    pub fn user_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UserNotFound, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = AppError::forbidden("missing user:delete");
        assert_eq!(err.to_string(), "FORBIDDEN: missing user:delete");
    }

    #[test]
    fn test_authentication_classification() {
        assert!(ErrorKind::NoTokenProvided.is_authentication());
        assert!(ErrorKind::ExpiredRefreshToken.is_authentication());
        assert!(!ErrorKind::Forbidden.is_authentication());
        assert!(!ErrorKind::Database.is_authentication());
    }
}
