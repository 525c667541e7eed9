//! Mail delivery backends.
//!
//! The destination talks to mail delivery only through [`MailTransport`].
//! Two `lettre`-based implementations are provided: [`smtp::SmtpMailTransport`]
//! for real delivery and [`outbox::OutboxTransport`] which drops `.eml` files
//! into a directory.

pub mod outbox;
pub mod smtp;

use std::path::Path;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::Message;
use thiserror::Error;

/// MIME type used for backup attachments.
pub const ATTACHMENT_MIME_TYPE: &str = "application/octet-stream";

/// Errors raised by mail transports.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("missing required config: {0}")]
    MissingConfig(String),

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Smtp(String),

    #[error("failed to write message to outbox: {0}")]
    Outbox(String),
}

/// The file attached to an outgoing backup message.
#[derive(Debug, Clone, Copy)]
pub struct AttachmentRef<'a> {
    pub filename: &'a str,
    /// Transient on-disk copy, for transports that attach by path.
    pub path: &'a Path,
    pub content: &'a [u8],
    pub mime_type: &'a str,
}

/// One message to one recipient.
#[derive(Debug, Clone, Copy)]
pub struct OutgoingMail<'a> {
    pub to: &'a str,
    pub from: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
    pub attachment: AttachmentRef<'a>,
}

/// Something that can deliver an [`OutgoingMail`].
///
/// Implementations must be shareable across threads: one destination may
/// serve several saves at once.
pub trait MailTransport: Send + Sync {
    /// Deliver `mail`. `Ok` means the transport accepted the message.
    fn send(&self, mail: &OutgoingMail<'_>) -> Result<(), TransportError>;
}

impl<T: MailTransport + ?Sized> MailTransport for &T {
    fn send(&self, mail: &OutgoingMail<'_>) -> Result<(), TransportError> {
        (**self).send(mail)
    }
}

impl<T: MailTransport + ?Sized> MailTransport for Box<T> {
    fn send(&self, mail: &OutgoingMail<'_>) -> Result<(), TransportError> {
        (**self).send(mail)
    }
}

/// Build a `multipart/mixed` message: plain-text body plus the attachment.
pub fn build_message(mail: &OutgoingMail<'_>) -> Result<Message, TransportError> {
    let from = parse_mailbox(mail.from)?;
    let to = parse_mailbox(mail.to)?;
    let content_type = ContentType::parse(mail.attachment.mime_type)
        .map_err(|e| TransportError::Build(format!("{}: {e}", mail.attachment.mime_type)))?;

    let attachment = Attachment::new(mail.attachment.filename.to_string())
        .body(mail.attachment.content.to_vec(), content_type);

    Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(mail.body.to_string()))
                .singlepart(attachment),
        )
        .map_err(|e| TransportError::Build(e.to_string()))
}

fn parse_mailbox(raw: &str) -> Result<Mailbox, TransportError> {
    raw.parse::<Mailbox>()
        .map_err(|e| TransportError::InvalidAddress(format!("{raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample<'a>(to: &'a str, path: &'a Path) -> OutgoingMail<'a> {
        OutgoingMail {
            to,
            from: "site@example.com",
            subject: "Backup File: db.sql",
            body: "Please find the backup file attached.",
            attachment: AttachmentRef {
                filename: "db.sql",
                path,
                content: b"SELECT 1;",
                mime_type: ATTACHMENT_MIME_TYPE,
            },
        }
    }

    #[test]
    fn test_build_message_contains_attachment() {
        let path = Path::new("/tmp/backup_x_db.sql");
        let message = build_message(&sample("ops@example.com", path)).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Backup File: db.sql"));
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("application/octet-stream"));
        assert!(raw.contains("filename=\"db.sql\""));
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let path = Path::new("/tmp/backup_x_db.sql");
        let err = build_message(&sample("not-an-address", path)).unwrap_err();
        assert!(matches!(err, TransportError::InvalidAddress(_)));
    }
}
