//! Notification collaborator interface.

use async_trait::async_trait;

use crate::error::AppError;

/// Outbound notification collaborator.
///
/// Fire-and-forget from the caller's perspective: delivery failures are
/// logged by the implementation, not surfaced to the requesting user.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a password-reset email carrying the signed reset token.
    async fn send_password_reset_email(&self, to: &str, token: &str) -> Result<(), AppError>;
}

/// Mailer implementation that only records the send via `tracing`.
///
/// Used in development and tests where no SMTP relay is available.
#[derive(Debug, Clone, Default)]
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send_password_reset_email(&self, to: &str, token: &str) -> Result<(), AppError> {
        tracing::info!(to = %to, token_len = token.len(), "password reset email queued");
        Ok(())
    }
}
