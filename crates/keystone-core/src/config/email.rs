//! Password-reset mail configuration.

use serde::{Deserialize, Serialize};

/// Outbound mail settings consumed by the notification collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// SMTP host.
    #[serde(default)]
    pub host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// SMTP username.
    #[serde(default)]
    pub username: String,
    /// SMTP password.
    #[serde(default)]
    pub password: String,
    /// From address for outgoing mail.
    #[serde(default = "default_from")]
    pub from: String,
    /// Frontend base URL used to build reset links.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from: default_from(),
            frontend_url: default_frontend_url(),
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from() -> String {
    "no-reply@keystone.local".to_string()
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}
