//! Clinic Mail
//!
//! Outbound email behind the `Notifier` trait. One call sends one message and
//! reports success or failure synchronously to the caller; nothing is queued
//! or retried here.
//!
//! - `SmtpNotifier`: STARTTLS relay via lettre (production)
//! - `LogNotifier`: logs the message and succeeds (no relay configured)

pub mod logging;
pub mod smtp;

use async_trait::async_trait;
use lettre::message::Mailbox;
use thiserror::Error;

pub use logging::LogNotifier;
pub use smtp::{SmtpConfig, SmtpNotifier};

/// A single plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// The relay answered but did not accept the message.
    #[error("relay refused message: {0}")]
    Refused(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, mail: &Mail) -> Result<(), MailError>;
}

/// Parse a recipient or sender the way the SMTP transport will. Callers that
/// need to reject an address before any side effect use this same check.
pub fn parse_address(address: &str) -> Result<Mailbox, MailError> {
    address
        .trim()
        .parse()
        .map_err(|_| MailError::InvalidAddress(address.to_string()))
}
