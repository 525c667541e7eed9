//! Per-destination settings.

use serde::{Deserialize, Serialize};

use crate::size;

use super::address;

/// Default subject prefix; the attachment's original file name is appended.
pub const DEFAULT_SUBJECT_PREFIX: &str = "Backup File: ";

/// Body used when none is configured.
pub const DEFAULT_BODY: &str = "Please find the backup file attached.";

/// Paragraph appended to the body when the attachment went out encrypted.
pub const ENCRYPTED_NOTE: &str = "Note: The backup file has been encrypted with a password for \
security. Please use the password you configured to decrypt the file.";

/// Configuration of one email destination.
///
/// Field names match the keys of the `[destination]` table in the config
/// file and of [`config_schema`](crate::destination::schema::config_schema).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationConfig {
    /// Comma-separated recipient addresses.
    pub email: String,
    /// Sender address. Falls back to the site default when empty.
    pub from: Option<String>,
    /// Subject line. Defaults to `"Backup File: <name>"`.
    pub subject: Option<String>,
    /// Message body. Defaults to [`DEFAULT_BODY`].
    pub body: Option<String>,
    /// Maximum attachment size, e.g. `"25MB"`. Defaults to 10 MB.
    pub max_size: Option<String>,
    /// Wrap the attachment in a password-protected ZIP.
    pub encrypt: bool,
    /// Password for the ZIP. Required when `encrypt` is set.
    pub encrypt_password: Option<String>,
}

impl DestinationConfig {
    /// Destination sending to `email` with every other setting at its default.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn recipients(&self) -> Vec<String> {
        address::parse_recipients(&self.email)
    }

    pub fn max_size_bytes(&self) -> u64 {
        size::max_size_bytes(self.max_size.as_deref())
    }

    /// The password, if one is set. Whitespace is significant here.
    pub fn password(&self) -> Option<&str> {
        self.encrypt_password.as_deref().filter(|p| !p.is_empty())
    }

    /// Sender address, or `site_default` when none is configured.
    pub fn sender<'a>(&'a self, site_default: &'a str) -> &'a str {
        non_empty(self.from.as_deref()).unwrap_or(site_default)
    }

    pub fn subject_for(&self, filename: &str) -> String {
        match non_empty(self.subject.as_deref()) {
            Some(subject) => subject.to_string(),
            None => format!("{DEFAULT_SUBJECT_PREFIX}{filename}"),
        }
    }

    /// Message body, with the encryption note appended when `encrypted`.
    pub fn body_text(&self, encrypted: bool) -> String {
        let mut body = non_empty(self.body.as_deref())
            .unwrap_or(DEFAULT_BODY)
            .to_string();
        if encrypted {
            body.push_str("\n\n");
            body.push_str(ENCRYPTED_NOTE);
        }
        body
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
