//! SMTP delivery via `lettre`.

use std::time::Duration;

use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};
use tracing::{debug, info};

use super::{build_message, MailTransport, OutgoingMail, TransportError};
use crate::config::{SmtpConfig, SmtpSecurity};

/// Sends each message over a (pooled) SMTP connection.
pub struct SmtpMailTransport {
    mailer: SmtpTransport,
}

impl SmtpMailTransport {
    /// Build a transport from the `[smtp]` config section.
    pub fn from_config(config: &SmtpConfig) -> Result<Self, TransportError> {
        let host = config
            .host
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| TransportError::MissingConfig("smtp.host".to_string()))?;

        let builder = match config.security {
            SmtpSecurity::Starttls => SmtpTransport::starttls_relay(host)
                .map_err(|e| TransportError::Smtp(e.to_string()))?,
            SmtpSecurity::Tls => {
                SmtpTransport::relay(host).map_err(|e| TransportError::Smtp(e.to_string()))?
            }
            SmtpSecurity::None => SmtpTransport::builder_dangerous(host),
        };

        let builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));
        let builder = match (config.username.as_deref(), config.password.as_deref()) {
            (Some(user), Some(pass)) => {
                builder.credentials(Credentials::new(user.to_string(), pass.to_string()))
            }
            _ => builder,
        };

        info!(
            host = %host,
            port = config.port,
            security = ?config.security,
            "SMTP transport initialized"
        );
        Ok(Self {
            mailer: builder.build(),
        })
    }
}

impl MailTransport for SmtpMailTransport {
    fn send(&self, mail: &OutgoingMail<'_>) -> Result<(), TransportError> {
        let message = build_message(mail)?;
        debug!(to = %mail.to, attachment = %mail.attachment.path.display(), "Sending over SMTP");
        self.mailer
            .send(&message)
            .map_err(|e| TransportError::Smtp(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_host_is_rejected() {
        let cfg = SmtpConfig::default();
        let err = SmtpMailTransport::from_config(&cfg)
            .err()
            .expect("missing host must fail");
        assert!(matches!(err, TransportError::MissingConfig(ref k) if k == "smtp.host"));
    }

    #[test]
    fn test_plaintext_transport_builds_without_connecting() {
        let cfg = SmtpConfig {
            host: Some("localhost".to_string()),
            port: 2525,
            security: SmtpSecurity::None,
            ..SmtpConfig::default()
        };
        assert!(SmtpMailTransport::from_config(&cfg).is_ok());
    }
}
