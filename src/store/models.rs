// Dory: Credential record models
//
// SECURITY: the secret value is private and never shows up in Debug or
// Display output. Wire names follow the record store's sheet columns.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// Identifier assigned by the record store, kept in the JSON type the store
/// used so it goes back out unchanged in update and delete bodies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Text(String),
    Number(Number),
}

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self::Text(id.into())
    }

    /// True when `label` is how this id is displayed. Lets typed input like
    /// `7` find a numeric id.
    pub fn matches(&self, label: &str) -> bool {
        match self {
            Self::Text(text) => text == label,
            Self::Number(number) => number.to_string() == label,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.pad(text),
            Self::Number(number) => f.pad(&number.to_string()),
        }
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self::Number(Number::from(id))
    }
}

/// Sheet cells come back as numbers, booleans or null as often as strings.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}

/// The editable part of a record. Every write resends the full set.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    #[serde(rename = "servicio", default, deserialize_with = "lenient_string")]
    pub service: String,
    #[serde(rename = "usuario", default, deserialize_with = "lenient_string")]
    pub username: String,
    /// The stored secret. NEVER printed, logged, or Debug-displayed.
    #[serde(rename = "contraseña", default, deserialize_with = "lenient_string")]
    secret: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(rename = "nota", default, deserialize_with = "lenient_string")]
    pub note: String,
    #[serde(rename = "categoria", default, deserialize_with = "lenient_string")]
    pub category: String,
}

impl RecordFields {
    pub fn new(
        service: impl Into<String>,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            username: username.into(),
            secret: secret.into(),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Access the raw secret value. Callers must not log it.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn set_secret(&mut self, secret: impl Into<String>) {
        self.secret = secret.into();
    }
}

impl fmt::Debug for RecordFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordFields")
            .field("service", &self.service)
            .field("username", &self.username)
            .field("secret", &"[REDACTED]")
            .field("url", &self.url)
            .field("note", &self.note)
            .field("category", &self.category)
            .finish()
    }
}

/// One stored secret as returned by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    #[serde(rename = "rowId")]
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: RecordFields,
}

impl fmt::Display for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.fields.service)?;
        if !self.fields.category.is_empty() {
            write!(f, " ({})", self.fields.category)?;
        }
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_store_row() {
        let json = r#"{
            "rowId": 7,
            "servicio": "Mail",
            "usuario": "val",
            "contraseña": "x",
            "url": "",
            "nota": "",
            "categoria": "personal"
        }"#;
        let record: CredentialRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, RecordId::from(7));
        assert!(record.id.matches("7"));
        assert_eq!(record.fields.service, "Mail");
        assert_eq!(record.fields.username, "val");
        assert_eq!(record.fields.secret(), "x");
        assert_eq!(record.fields.category, "personal");
    }

    #[test]
    fn test_parse_string_id_and_lenient_cells() {
        let json = r#"{"rowId":"row-7","servicio":"Bank","usuario":1234,"contraseña":5678,"nota":null}"#;
        let record: CredentialRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, RecordId::from("row-7"));
        assert!(!record.id.matches("7"));
        assert_eq!(record.fields.username, "1234");
        assert_eq!(record.fields.secret(), "5678");
        assert_eq!(record.fields.note, "");
        assert_eq!(record.fields.url, "", "Missing cells default to empty");
    }

    #[test]
    fn test_record_id_keeps_json_type() {
        let numeric: RecordId = serde_json::from_str("7").unwrap();
        let text: RecordId = serde_json::from_str(r#""7""#).unwrap();
        assert_ne!(numeric, text);
        assert_eq!(serde_json::to_string(&numeric).unwrap(), "7");
        assert_eq!(serde_json::to_string(&text).unwrap(), r#""7""#);
        assert_eq!(format!("[{:<4}]", numeric), "[7   ]");
    }

    #[test]
    fn test_row_without_id_is_rejected() {
        let json = r#"{"servicio":"Mail","usuario":"val","contraseña":"x"}"#;
        assert!(serde_json::from_str::<CredentialRecord>(json).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let fields = RecordFields::new("Mail", "val", "hunter2-super-secret");
        let record = CredentialRecord {
            id: RecordId::from("row-1"),
            fields,
        };
        let debug = format!("{:?}", record);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2-super-secret"));
    }

    #[test]
    fn test_display_omits_secret_and_username() {
        let record = CredentialRecord {
            id: RecordId::from("row-2"),
            fields: RecordFields::new("Netflix", "someone", "pa55").with_category("streaming"),
        };
        let display = record.to_string();
        assert_eq!(display, "[row-2] Netflix (streaming)");
    }

    #[test]
    fn test_fields_serialize_with_store_names() {
        let fields = RecordFields::new("Mail", "val", "x")
            .with_url("https://mail.example")
            .with_note("n")
            .with_category("personal");
        let value = serde_json::to_value(&fields).unwrap();
        assert_eq!(value["servicio"], "Mail");
        assert_eq!(value["usuario"], "val");
        assert_eq!(value["contraseña"], "x");
        assert_eq!(value["url"], "https://mail.example");
        assert_eq!(value["nota"], "n");
        assert_eq!(value["categoria"], "personal");
    }
}
