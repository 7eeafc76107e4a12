// Dory: Form Reconciler
//
// Turns the editor's fields into a write. With no record being edited the
// form creates a record; otherwise it updates that record, resending every
// field without diffing against the original.

use thiserror::Error;

use crate::store::{CredentialRecord, Mutation, RecordFields, RecordId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field is empty: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    pub fields: RecordFields,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the editor from an existing record.
    pub fn seed(&mut self, record: &CredentialRecord) {
        self.fields = record.fields.clone();
    }

    pub fn clear(&mut self) {
        self.fields = RecordFields::default();
    }

    /// Service, username and secret must be non-blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("service", self.fields.service.as_str()),
            ("username", self.fields.username.as_str()),
            ("secret", self.fields.secret()),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(name));
            }
        }
        Ok(())
    }

    pub fn reconcile(&self, editing: Option<&RecordId>) -> Result<Mutation, ValidationError> {
        self.validate()?;
        let fields = self.fields.clone();
        Ok(match editing {
            None => Mutation::Create(fields),
            Some(id) => Mutation::Update {
                id: id.clone(),
                fields,
            },
        })
    }
}
