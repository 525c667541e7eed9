//! The backup file handed to a destination.
//!
//! Artifacts are owned by the backup pipeline. Destinations only read them;
//! they never mutate or delete the source.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{BackupMailError, Result};

/// Read access to a finished backup file.
pub trait BackupArtifact {
    /// Logical file name including extensions (e.g. `"site-2024.sql.gz"`).
    fn full_name(&self) -> &str;

    /// Size as reported by the artifact's metadata. May be stale or absent.
    fn filesize(&self) -> Option<u64>;

    /// Open a fresh reader over the content. Closing happens on drop.
    fn open(&self) -> Result<Box<dyn Read + '_>>;
}

/// A backup file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileArtifact {
    path: PathBuf,
    name: String,
    size: Option<u64>,
}

impl FileArtifact {
    /// Wrap `path`, taking the name from the final path component and the
    /// size from filesystem metadata.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let meta = std::fs::metadata(&path).map_err(|e| BackupMailError::io(&path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "backup".to_string());
        Ok(Self {
            path,
            name,
            size: Some(meta.len()),
        })
    }

    /// Override the logical name presented to recipients.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BackupArtifact for FileArtifact {
    fn full_name(&self) -> &str {
        &self.name
    }

    fn filesize(&self) -> Option<u64> {
        self.size
    }

    fn open(&self) -> Result<Box<dyn Read + '_>> {
        let file = File::open(&self.path).map_err(|e| BackupMailError::io(&self.path, e))?;
        Ok(Box::new(file))
    }
}

/// Upper bound on the buffer reserved up front from the reported size.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// Read the whole artifact into memory, `chunk_size` bytes at a time.
///
/// The reported size is only a capacity hint; the buffer grows with what
/// the reader actually yields.
pub fn read_fully(artifact: &dyn BackupArtifact, chunk_size: usize) -> Result<Vec<u8>> {
    let name = artifact.full_name();
    let mut reader = artifact.open()?;
    let hint = artifact.filesize().unwrap_or(0).min(MAX_PREALLOC);
    let mut content = Vec::with_capacity(usize::try_from(hint).unwrap_or(0));
    let mut chunk = vec![0u8; chunk_size.max(1)];
    loop {
        let read = reader
            .read(&mut chunk)
            .map_err(|e| BackupMailError::io(name, e))?;
        if read == 0 {
            break;
        }
        content.extend_from_slice(&chunk[..read]);
    }
    debug!(filename = %name, bytes = content.len(), "Read backup artifact");
    Ok(content)
}
