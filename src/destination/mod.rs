//! The destination surface a backup framework talks to.

pub mod email;
pub mod schema;

use crate::error::Result;
use crate::model::artifact::BackupArtifact;
use crate::model::destination::DestinationConfig;

pub use email::{Archiver, EmailDestination, EncryptionStatus, SaveReport};
pub use schema::{config_schema, ConfigSchema, Operation};

/// A file a storage destination holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub size: u64,
}

/// Sort direction for [`FileQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Paging and sorting for [`Destination::query_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileQuery {
    pub sort: String,
    pub direction: SortDirection,
    pub count: usize,
    pub start: usize,
}

impl Default for FileQuery {
    fn default() -> Self {
        Self {
            sort: "datestamp".to_string(),
            direction: SortDirection::Desc,
            count: 100,
            start: 0,
        }
    }
}

/// A place finished backups are written to.
///
/// Listing methods default to "nothing stored", which is what send-only
/// destinations report.
pub trait Destination {
    /// Result of a successful write.
    type Report;

    /// Check the configuration without side effects.
    fn validate(&self, config: &DestinationConfig) -> Result<()>;

    /// Deliver `artifact`.
    fn save(&self, artifact: &dyn BackupArtifact, config: &DestinationConfig)
        -> Result<Self::Report>;

    /// Operations this destination advertises.
    fn supported_ops(&self) -> &'static [&'static str] {
        &["save_file"]
    }

    fn is_storage_destination(&self) -> bool {
        false
    }

    fn list_files(&self) -> Vec<StoredFile> {
        Vec::new()
    }

    fn query_files(&self, _query: &FileQuery) -> Vec<StoredFile> {
        Vec::new()
    }

    fn count_files(&self) -> usize {
        0
    }

    fn file_exists(&self, _id: &str) -> bool {
        false
    }

    /// Returns whether something was deleted.
    fn delete_file(&self, _id: &str) -> bool {
        false
    }

    fn get_file(&self, _id: &str) -> Option<StoredFile> {
        None
    }

    fn config_schema(&self, operation: Operation) -> ConfigSchema;
}
