//! Writes messages as `.eml` files instead of sending them.

use std::path::{Path, PathBuf};

use lettre::{FileTransport, Transport};
use tracing::debug;

use super::{build_message, MailTransport, OutgoingMail, TransportError};

/// Drops every message into `dir` as `<message-id>.eml`.
pub struct OutboxTransport {
    dir: PathBuf,
    inner: FileTransport,
}

impl OutboxTransport {
    /// Create the transport, creating `dir` if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, TransportError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .map_err(|e| TransportError::Outbox(format!("{}: {e}", dir.display())))?;
        Ok(Self {
            inner: FileTransport::new(&dir),
            dir,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl MailTransport for OutboxTransport {
    fn send(&self, mail: &OutgoingMail<'_>) -> Result<(), TransportError> {
        let message = build_message(mail)?;
        self.inner
            .send(&message)
            .map_err(|e| TransportError::Outbox(e.to_string()))?;
        debug!(to = %mail.to, dir = %self.dir.display(), "Wrote message to outbox");
        Ok(())
    }
}
