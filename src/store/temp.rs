//! Transient attachment files.
//!
//! Mail transports attach by path, so the final payload is written to a
//! uniquely named temporary file for the duration of one dispatch. The
//! [`TransientAttachment`] guard removes it again on every exit path.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{BackupMailError, Result};

/// Prefix of every transient attachment file name.
pub const TRANSIENT_PREFIX: &str = "backup_";

/// Scratch space for transient files.
pub trait TempStorage: Send + Sync {
    /// A path that no other caller will be handed, ending in `name`.
    fn unique_path(&self, prefix: &str, name: &str) -> PathBuf;

    fn write_all(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    /// Remove `path`. Removing a file that does not exist is not an error.
    fn delete(&self, path: &Path) -> Result<()>;
}

/// [`TempStorage`] backed by a filesystem directory.
#[derive(Debug, Clone)]
pub struct FsTempStorage {
    dir: PathBuf,
}

impl FsTempStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Use the system temporary directory.
    pub fn system() -> Self {
        Self::new(std::env::temp_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Default for FsTempStorage {
    fn default() -> Self {
        Self::system()
    }
}

impl TempStorage for FsTempStorage {
    fn unique_path(&self, prefix: &str, name: &str) -> PathBuf {
        let name = sanitize_filename_part(name, 150);
        self.dir
            .join(format!("{prefix}{}_{name}", Uuid::new_v4().simple()))
    }

    fn write_all(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| BackupMailError::io(&self.dir, e))?;
        std::fs::write(path, bytes).map_err(|e| BackupMailError::io(path, e))
    }

    fn delete(&self, path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BackupMailError::io(path, e)),
        }
    }
}

/// A temporary copy of the outgoing payload, deleted exactly once.
///
/// Deletion happens on [`release`](Self::release) or, failing that, on drop
/// (including while unwinding from a panic).
pub struct TransientAttachment<'s> {
    storage: &'s dyn TempStorage,
    path: Option<PathBuf>,
}

impl<'s> TransientAttachment<'s> {
    /// Write `bytes` to a fresh unique path in `storage`.
    ///
    /// A partially written file is removed before the error is returned.
    pub fn materialize(storage: &'s dyn TempStorage, name: &str, bytes: &[u8]) -> Result<Self> {
        let path = storage.unique_path(TRANSIENT_PREFIX, name);
        let guard = Self {
            storage,
            path: Some(path),
        };
        storage.write_all(guard.path(), bytes)?;
        debug!(path = %guard.path().display(), bytes = bytes.len(), "Materialized attachment");
        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        self.path
            .as_deref()
            .unwrap_or_else(|| Path::new(""))
    }

    /// Delete the file now and report the outcome.
    pub fn release(mut self) -> Result<()> {
        self.cleanup()
    }

    fn cleanup(&mut self) -> Result<()> {
        match self.path.take() {
            Some(path) => {
                debug!(path = %path.display(), "Removing transient attachment");
                self.storage.delete(&path)
            }
            None => Ok(()),
        }
    }
}

impl Drop for TransientAttachment<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            warn!(error = %e, "Failed to remove transient attachment");
        }
    }
}

/// Replace anything but alphanumerics and `-._@` with `_`, truncating to
/// `max_len` characters.
pub fn sanitize_filename_part(s: &str, max_len: usize) -> String {
    let sanitized: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '.' || c == '_' || c == '@' {
                c
            } else {
                '_'
            }
        })
        .take(max_len)
        .collect();

    if sanitized.is_empty() {
        "unknown".to_string()
    } else {
        sanitized
    }
}
