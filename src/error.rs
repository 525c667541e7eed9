//! Centralized error types for backupmail.

use std::path::PathBuf;

use humansize::{format_size, BINARY};
use thiserror::Error;

use crate::transport::TransportError;

/// All errors produced by the backupmail library.
#[derive(Error, Debug)]
pub enum BackupMailError {
    /// The destination configuration cannot be used for sending.
    #[error("Configuration error: {0}")]
    Configuration(ConfigProblem),

    /// The backup exceeds the configured attachment size limit.
    #[error(
        "Backup file {filename} ({}) exceeds the maximum email attachment size of {}",
        human(.size),
        human(.limit)
    )]
    AttachmentTooLarge {
        filename: String,
        size: u64,
        limit: u64,
    },

    /// No recipient accepted the message.
    #[error("Failed to send backup file {filename} to: {}", .failed.join(", "))]
    DeliveryFailed {
        filename: String,
        failed: Vec<String>,
    },

    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A mail transport could not be constructed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Reasons a [`DestinationConfig`](crate::model::destination::DestinationConfig)
/// fails validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigProblem {
    #[error("No email addresses configured for backup destination")]
    NoRecipients,

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Encryption password is required when encryption is enabled")]
    MissingEncryptionPassword,
}

/// Convenience alias for `Result<T, BackupMailError>`.
pub type Result<T> = std::result::Result<T, BackupMailError>;

impl BackupMailError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// `true` for errors raised before anything was read or sent.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl From<ConfigProblem> for BackupMailError {
    fn from(problem: ConfigProblem) -> Self {
        Self::Configuration(problem)
    }
}

fn human(bytes: &u64) -> String {
    format_size(*bytes, BINARY)
}
