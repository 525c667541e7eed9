//! Per-recipient delivery and result aggregation.

use tracing::{error, info};

use crate::error::{BackupMailError, Result};
use crate::transport::{AttachmentRef, MailTransport, OutgoingMail, TransportError};

/// Everything about a message except its recipient.
#[derive(Debug, Clone, Copy)]
pub struct Envelope<'a> {
    pub from: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
    pub attachment: AttachmentRef<'a>,
}

impl<'a> Envelope<'a> {
    fn to(&self, recipient: &'a str) -> OutgoingMail<'a> {
        OutgoingMail {
            to: recipient,
            from: self.from,
            subject: self.subject,
            body: self.body,
            attachment: self.attachment,
        }
    }
}

/// Outcome of one delivery attempt.
#[derive(Debug)]
pub struct RecipientOutcome<'a> {
    pub recipient: &'a str,
    pub result: std::result::Result<(), TransportError>,
}

/// Aggregate of all delivery attempts for one save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchResult {
    pub delivered: usize,
    /// Failed addresses, in recipient order.
    pub failed: Vec<String>,
}

impl DispatchResult {
    /// Fold step: account for one more outcome.
    pub fn record(mut self, outcome: RecipientOutcome<'_>) -> Self {
        match outcome.result {
            Ok(()) => self.delivered += 1,
            Err(_) => self.failed.push(outcome.recipient.to_string()),
        }
        self
    }

    /// Log the aggregate and turn zero deliveries into an error.
    pub fn finish(self, filename: &str) -> Result<Self> {
        if self.delivered > 0 {
            info!(
                filename = %filename,
                count = self.delivered,
                "Backup file sent successfully to {} recipient(s)",
                self.delivered
            );
        }
        if !self.failed.is_empty() {
            error!(
                filename = %filename,
                failed = %self.failed.join(", "),
                "Failed to send backup file to some recipients"
            );
        }
        if self.delivered == 0 {
            return Err(BackupMailError::DeliveryFailed {
                filename: filename.to_string(),
                failed: self.failed,
            });
        }
        Ok(self)
    }
}

/// Send `envelope` to every recipient independently.
///
/// A failing recipient never stops the attempts for the remaining ones.
pub fn dispatch(
    transport: &dyn MailTransport,
    envelope: &Envelope<'_>,
    recipients: &[String],
) -> DispatchResult {
    recipients
        .iter()
        .map(|to| {
            let result = transport.send(&envelope.to(to));
            match &result {
                Ok(()) => info!(
                    filename = %envelope.attachment.filename,
                    email = %to,
                    "Backup file sent"
                ),
                Err(e) => error!(
                    filename = %envelope.attachment.filename,
                    email = %to,
                    error = %e,
                    "Failed to send backup file"
                ),
            }
            RecipientOutcome {
                recipient: to,
                result,
            }
        })
        .fold(DispatchResult::default(), DispatchResult::record)
}
