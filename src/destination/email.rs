//! Email destination: sends each backup as an attachment.
//!
//! Save pipeline:
//! validate → size gate → read → (encrypt) → materialize → dispatch → cleanup.
//! The size gate runs on reported metadata so oversized files are rejected
//! before their content is buffered.

use std::borrow::Cow;

use tracing::{debug, error, warn};

use super::schema::{config_schema, ConfigSchema, Operation};
use super::Destination;
use crate::archive::{self, ArchiveOutcome, FallbackReason};
use crate::dispatch::{dispatch, Envelope};
use crate::error::{BackupMailError, ConfigProblem, Result};
use crate::model::address;
use crate::model::artifact::{read_fully, BackupArtifact};
use crate::model::destination::DestinationConfig;
use crate::store::temp::{FsTempStorage, TempStorage, TransientAttachment};
use crate::transport::{AttachmentRef, MailTransport, ATTACHMENT_MIME_TYPE};

/// Default read chunk for backup artifacts (512 KiB).
pub const DEFAULT_READ_CHUNK_SIZE: usize = 512 * 1024;

/// Archival stage: `(content, filename, password)` to an [`ArchiveOutcome`].
pub type Archiver = fn(&[u8], &str, &str) -> ArchiveOutcome;

/// How the attachment left the encryption stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncryptionStatus {
    NotRequested,
    Encrypted,
    /// Encryption was requested but the plaintext went out instead.
    Fallback(FallbackReason),
}

/// Summary of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// Name the attachment was sent under.
    pub filename: String,
    pub delivered: usize,
    /// Recipients that could not be reached, in configured order.
    pub failed: Vec<String>,
    pub encryption: EncryptionStatus,
}

/// Sends backups by email through an injected [`MailTransport`].
pub struct EmailDestination<T, S = FsTempStorage> {
    transport: T,
    storage: S,
    site_mail: String,
    read_chunk_size: usize,
    archiver: Archiver,
}

impl<T: MailTransport> EmailDestination<T> {
    /// Destination using the system temp dir for transient attachments.
    pub fn new(transport: T, site_mail: impl Into<String>) -> Self {
        Self::with_storage(transport, FsTempStorage::system(), site_mail)
    }
}

impl<T: MailTransport, S: TempStorage> EmailDestination<T, S> {
    pub fn with_storage(transport: T, storage: S, site_mail: impl Into<String>) -> Self {
        Self {
            transport,
            storage,
            site_mail: site_mail.into(),
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            archiver: archive::encrypt_payload,
        }
    }

    pub fn read_chunk_size(mut self, bytes: usize) -> Self {
        self.read_chunk_size = bytes.max(1);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Replace the archival stage, e.g. to plug in another archive format.
    pub fn archiver(mut self, archiver: Archiver) -> Self {
        self.archiver = archiver;
        self
    }

    /// Check recipients, address syntax and the encryption password.
    pub fn validate(&self, config: &DestinationConfig) -> Result<()> {
        validate_config(config)
    }

    /// Email `artifact` to every configured recipient.
    ///
    /// Succeeds when at least one recipient accepted the message; partial
    /// failures are listed in the returned [`SaveReport`].
    pub fn save(
        &self,
        artifact: &dyn BackupArtifact,
        config: &DestinationConfig,
    ) -> Result<SaveReport> {
        self.validate(config)?;

        let original_name = artifact.full_name();
        check_size(original_name, artifact.filesize(), config.max_size_bytes())?;

        let content = read_fully(artifact, self.read_chunk_size)?;

        let (filename, payload, encryption) = if config.encrypt {
            let password = config.password().unwrap_or("");
            match (self.archiver)(&content, original_name, password) {
                ArchiveOutcome::Encrypted(p) => (
                    Cow::Owned(p.filename),
                    Cow::Owned(p.content),
                    EncryptionStatus::Encrypted,
                ),
                ArchiveOutcome::Fallback(reason) => (
                    Cow::Borrowed(original_name),
                    Cow::Borrowed(content.as_slice()),
                    EncryptionStatus::Fallback(reason),
                ),
            }
        } else {
            (
                Cow::Borrowed(original_name),
                Cow::Borrowed(content.as_slice()),
                EncryptionStatus::NotRequested,
            )
        };

        let subject = config.subject_for(original_name);
        let body = config.body_text(encryption == EncryptionStatus::Encrypted);
        let from = config.sender(&self.site_mail);
        let recipients = config.recipients();

        let attachment = TransientAttachment::materialize(&self.storage, &filename, &payload)?;
        let envelope = Envelope {
            from,
            subject: &subject,
            body: &body,
            attachment: AttachmentRef {
                filename: &filename,
                path: attachment.path(),
                content: &payload,
                mime_type: ATTACHMENT_MIME_TYPE,
            },
        };
        let result = dispatch(&self.transport, &envelope, &recipients);
        if let Err(e) = attachment.release() {
            warn!(error = %e, "Failed to remove transient attachment");
        }

        let result = result.finish(&filename)?;
        Ok(SaveReport {
            filename: filename.into_owned(),
            delivered: result.delivered,
            failed: result.failed,
            encryption,
        })
    }
}

impl<T: MailTransport, S: TempStorage> Destination for EmailDestination<T, S> {
    type Report = SaveReport;

    fn validate(&self, config: &DestinationConfig) -> Result<()> {
        EmailDestination::validate(self, config)
    }

    fn save(&self, artifact: &dyn BackupArtifact, config: &DestinationConfig) -> Result<SaveReport> {
        EmailDestination::save(self, artifact, config)
    }

    fn config_schema(&self, operation: Operation) -> ConfigSchema {
        config_schema(operation)
    }
}

/// Validate a destination configuration. Pure: the same config always gives
/// the same answer.
pub fn validate_config(config: &DestinationConfig) -> Result<()> {
    let recipients = config.recipients();
    if recipients.is_empty() {
        return Err(ConfigProblem::NoRecipients.into());
    }
    if let Some(bad) = address::first_invalid(&recipients) {
        return Err(ConfigProblem::InvalidAddress(bad.to_string()).into());
    }
    if config.encrypt && config.password().is_none() {
        return Err(ConfigProblem::MissingEncryptionPassword.into());
    }
    Ok(())
}

/// Reject artifacts whose reported size exceeds `limit`. Unknown sizes count
/// as zero.
pub fn check_size(filename: &str, reported: Option<u64>, limit: u64) -> Result<()> {
    let size = reported.unwrap_or(0);
    if size > limit {
        let err = BackupMailError::AttachmentTooLarge {
            filename: filename.to_string(),
            size,
            limit,
        };
        error!(filename = %filename, size, limit, "{err}");
        return Err(err);
    }
    debug!(filename = %filename, size, limit, "Backup file within attachment limit");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_size_boundaries() {
        assert!(check_size("a", Some(10), 10).is_ok());
        assert!(check_size("a", None, 0).is_ok());
        let err = check_size("a.sql", Some(11), 10).unwrap_err();
        assert!(matches!(
            err,
            BackupMailError::AttachmentTooLarge { size: 11, limit: 10, .. }
        ));
    }
}
