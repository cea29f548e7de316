use async_trait::async_trait;
use tracing::info;

use crate::{Mail, MailError, Notifier};

/// Stand-in used when no SMTP relay is configured: every mail is logged and
/// reported as sent.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, mail: &Mail) -> Result<(), MailError> {
        info!(
            to = %mail.to,
            subject = %mail.subject,
            body_len = mail.body.len(),
            "No SMTP relay configured, mail logged instead of sent"
        );
        Ok(())
    }
}
