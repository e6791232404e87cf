//! Core traits defined in `keystone-core` and implemented by other crates.

pub mod mailer;

pub use mailer::{Mailer, TracingMailer};
