//! Password-protected ZIP wrapping for attachments.
//!
//! The whole payload is archived in memory. Encryption is best-effort: when
//! archive support is missing or the archive cannot be built, the caller gets
//! a [`ArchiveOutcome::Fallback`] and sends the original bytes instead.

use std::path::Path;

use tracing::{error, warn};

/// Extension of the produced archive.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Suffix inserted between the original stem and the archive extension.
pub const ENCRYPTED_SUFFIX: &str = "_encrypted";

/// Archive bytes plus the name they should be attached under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Why a payload went out unencrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No password was available.
    EmptyPassword,
    /// Built without the `encryption` feature.
    Unavailable,
    /// Writing the archive failed.
    ArchiveFailed(String),
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPassword => write!(f, "no encryption password"),
            Self::Unavailable => write!(f, "ZIP archive support not available"),
            Self::ArchiveFailed(reason) => write!(f, "failed to create encrypted ZIP: {reason}"),
        }
    }
}

/// Result of the archival stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    Encrypted(EncryptedPayload),
    Fallback(FallbackReason),
}

/// Name of the encrypted attachment: `report.sql` → `report_encrypted.zip`.
pub fn encrypted_filename(original: &str) -> String {
    let stem = Path::new(original)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "backup".to_string());
    format!("{stem}{ENCRYPTED_SUFFIX}.{ARCHIVE_EXTENSION}")
}

/// Wrap `content` in a single-entry AES-256 ZIP named `filename`.
pub fn encrypt_payload(content: &[u8], filename: &str, password: &str) -> ArchiveOutcome {
    if password.is_empty() {
        warn!(filename = %filename, "Encryption requested without a password, sending unencrypted");
        return ArchiveOutcome::Fallback(FallbackReason::EmptyPassword);
    }

    finish_archive(filename, write_archive(content, filename, password))
}

fn finish_archive<E: std::fmt::Display>(
    filename: &str,
    written: Result<Option<Vec<u8>>, E>,
) -> ArchiveOutcome {
    match written {
        Ok(Some(archive)) => ArchiveOutcome::Encrypted(EncryptedPayload {
            filename: encrypted_filename(filename),
            content: archive,
        }),
        Ok(None) => {
            warn!("ZIP archive support not available, encryption disabled");
            ArchiveOutcome::Fallback(FallbackReason::Unavailable)
        }
        Err(e) => {
            error!(filename = %filename, error = %e, "Failed to create encrypted ZIP file");
            ArchiveOutcome::Fallback(FallbackReason::ArchiveFailed(e.to_string()))
        }
    }
}

#[cfg(feature = "encryption")]
fn write_archive(
    content: &[u8],
    filename: &str,
    password: &str,
) -> zip::result::ZipResult<Option<Vec<u8>>> {
    let cursor = write_archive_to(std::io::Cursor::new(Vec::new()), content, filename, password)?;
    Ok(Some(cursor.into_inner()))
}

#[cfg(feature = "encryption")]
fn write_archive_to<W: std::io::Write + std::io::Seek>(
    sink: W,
    content: &[u8],
    filename: &str,
    password: &str,
) -> zip::result::ZipResult<W> {
    use std::io::Write;

    use zip::write::FileOptions;
    use zip::{AesMode, CompressionMethod, ZipWriter};

    let mut zip = ZipWriter::new(sink);
    let options: FileOptions<'_, ()> = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .with_aes_encryption(AesMode::Aes256, password);

    zip.start_file(filename, options)?;
    zip.write_all(content)?;
    zip.finish()
}

#[cfg(not(feature = "encryption"))]
fn write_archive(
    _content: &[u8],
    _filename: &str,
    _password: &str,
) -> std::io::Result<Option<Vec<u8>>> {
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypted_filename() {
        assert_eq!(encrypted_filename("report.sql"), "report_encrypted.zip");
        assert_eq!(encrypted_filename("site.sql.gz"), "site.sql_encrypted.zip");
        assert_eq!(encrypted_filename("README"), "README_encrypted.zip");
        assert_eq!(encrypted_filename(""), "backup_encrypted.zip");
    }

    #[test]
    fn test_empty_password_falls_back() {
        let outcome = encrypt_payload(b"data", "db.sql", "");
        assert_eq!(outcome, ArchiveOutcome::Fallback(FallbackReason::EmptyPassword));
    }

    #[cfg(feature = "encryption")]
    #[test]
    fn test_round_trip() {
        use std::io::{Cursor, Read};

        let content = b"INSERT INTO users VALUES (1, 'root');\n".repeat(100);
        let outcome = encrypt_payload(&content, "report.sql", "correct horse");
        let payload = match outcome {
            ArchiveOutcome::Encrypted(p) => p,
            other => panic!("expected encryption, got {other:?}"),
        };
        assert_eq!(payload.filename, "report_encrypted.zip");
        assert_ne!(payload.content, content);

        let mut archive = zip::ZipArchive::new(Cursor::new(payload.content)).unwrap();
        assert_eq!(archive.len(), 1);
        let mut entry = archive.by_index_decrypt(0, b"correct horse").unwrap();
        assert_eq!(entry.name(), "report.sql");
        let mut out = Vec::new();
        entry.read_to_end(&mut out).unwrap();
        assert_eq!(out, content);
    }

    #[cfg(feature = "encryption")]
    #[test]
    fn test_wrong_password_rejected() {
        use std::io::{Cursor, Read};

        let payload = match encrypt_payload(b"secret rows", "db.sql", "right") {
            ArchiveOutcome::Encrypted(p) => p,
            other => panic!("expected encryption, got {other:?}"),
        };
        let mut archive = zip::ZipArchive::new(Cursor::new(payload.content)).unwrap();
        let opened = archive.by_index_decrypt(0, b"wrong").and_then(|mut entry| {
            let mut out = Vec::new();
            entry.read_to_end(&mut out)?;
            Ok(out)
        });
        assert!(opened.is_err());
    }

    /// A sink whose every write fails, like a full disk.
    #[cfg(feature = "encryption")]
    struct FullSink;

    #[cfg(feature = "encryption")]
    impl std::io::Write for FullSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[cfg(feature = "encryption")]
    impl std::io::Seek for FullSink {
        fn seek(&mut self, _pos: std::io::SeekFrom) -> std::io::Result<u64> {
            Ok(0)
        }
    }

    #[cfg(feature = "encryption")]
    #[test]
    fn test_write_failure_falls_back() {
        let written =
            write_archive_to(FullSink, b"rows", "db.sql", "pw").map(|_| Some(Vec::new()));
        match finish_archive("db.sql", written) {
            ArchiveOutcome::Fallback(FallbackReason::ArchiveFailed(reason)) => {
                assert!(!reason.is_empty());
            }
            other => panic!("expected archive failure, got {other:?}"),
        }
    }

    #[test]
    fn test_archive_error_is_reported() {
        let written: std::io::Result<Option<Vec<u8>>> =
            Err(std::io::Error::other("no space left on device"));
        assert_eq!(
            finish_archive("db.sql", written),
            ArchiveOutcome::Fallback(FallbackReason::ArchiveFailed(
                "no space left on device".to_string()
            ))
        );
    }

    #[cfg(not(feature = "encryption"))]
    #[test]
    fn test_unavailable_without_feature() {
        let outcome = encrypt_payload(b"data", "db.sql", "pw");
        assert_eq!(outcome, ArchiveOutcome::Fallback(FallbackReason::Unavailable));
    }
}
