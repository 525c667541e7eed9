//! Field descriptors consumed by configuration front-ends.

use serde::Serialize;

use crate::size::DEFAULT_MAX_SIZE;

/// The framework operation a schema is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Setting up the destination.
    Initialize,
    Backup,
    Restore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Boolean,
    Password,
}

/// One configurable field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    /// Key in [`DestinationConfig`](crate::model::destination::DestinationConfig).
    pub key: &'static str,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub title: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub multiline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigSchema {
    pub fields: Vec<FieldSchema>,
}

impl ConfigSchema {
    pub fn field(&self, key: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.key == key)
    }
}

impl FieldSchema {
    fn text(key: &'static str, title: &'static str, description: &'static str) -> Self {
        Self {
            key,
            kind: FieldKind::Text,
            title,
            description,
            required: false,
            multiline: false,
            default_value: None,
        }
    }
}

/// Fields shown when configuring an email destination.
///
/// Only [`Operation::Initialize`] has fields; other operations get an empty
/// schema.
pub fn config_schema(operation: Operation) -> ConfigSchema {
    if operation != Operation::Initialize {
        return ConfigSchema::default();
    }

    let fields = vec![
        FieldSchema {
            required: true,
            ..FieldSchema::text(
                "email",
                "Recipient Email Addresses",
                "Enter email addresses separated by commas (e.g., admin@site.com, \
                 backup@site.com). This is required.",
            )
        },
        FieldSchema::text(
            "from",
            "Sender Email Address",
            "Enter the sender email address. Leave empty to use the site default.",
        ),
        FieldSchema::text(
            "subject",
            "Email Subject Line",
            "Custom subject for backup emails. Leave empty for default.",
        ),
        FieldSchema {
            multiline: true,
            ..FieldSchema::text(
                "body",
                "Email Message Body",
                "Custom message to include in backup emails. Leave empty for default.",
            )
        },
        FieldSchema {
            default_value: Some(serde_json::json!(DEFAULT_MAX_SIZE)),
            ..FieldSchema::text(
                "max_size",
                "Maximum File Size",
                "Maximum size for email attachments (e.g., \"10MB\", \"25MB\"). Default is 10MB.",
            )
        },
        FieldSchema {
            kind: FieldKind::Boolean,
            default_value: Some(serde_json::json!(false)),
            ..FieldSchema::text(
                "encrypt",
                "Encrypt Backup File",
                "Encrypt the backup file with a password before sending. Recommended for \
                 sensitive data.",
            )
        },
        FieldSchema {
            kind: FieldKind::Password,
            ..FieldSchema::text(
                "encrypt_password",
                "Encryption Password",
                "Password to encrypt the backup file. Required if encryption is enabled. \
                 Use a strong password.",
            )
        },
    ];

    ConfigSchema { fields }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_lists_all_fields() {
        let schema = config_schema(Operation::Initialize);
        let keys: Vec<&str> = schema.fields.iter().map(|f| f.key).collect();
        assert_eq!(
            keys,
            vec!["email", "from", "subject", "body", "max_size", "encrypt", "encrypt_password"]
        );
        assert!(schema.field("email").unwrap().required);
        assert!(schema.field("body").unwrap().multiline);
        assert_eq!(schema.field("encrypt").unwrap().kind, FieldKind::Boolean);
        assert_eq!(
            schema.field("encrypt_password").unwrap().kind,
            FieldKind::Password
        );
    }

    #[test]
    fn test_other_operations_are_empty() {
        assert!(config_schema(Operation::Backup).fields.is_empty());
        assert!(config_schema(Operation::Restore).fields.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(config_schema(Operation::Initialize)).unwrap();
        let max = &json["fields"][4];
        assert_eq!(max["key"], "max_size");
        assert_eq!(max["type"], "text");
        assert_eq!(max["default_value"], "10MB");
        assert!(max.get("required").is_none());
    }
}
