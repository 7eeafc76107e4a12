// Dory: Session state and Panic Mode
//
// Panic mode is display-only: it swaps usernames and secrets for a mask
// token in the rows handed to the renderer and never touches record data.

use crate::store::{CredentialRecord, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    List,
    Editor,
}

/// Per-authentication session state; reset to defaults on logout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub authenticated: bool,
    pub view: View,
    pub panic_mode: bool,
    pub editing: Option<RecordId>,
}

impl SessionState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Flip panic mode and return the new value.
    pub fn toggle_panic(&mut self) -> bool {
        self.panic_mode = !self.panic_mode;
        self.panic_mode
    }
}

/// One record as it should be displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordView {
    pub id: RecordId,
    pub service: String,
    pub username: String,
    pub secret: String,
    pub url: String,
    pub note: String,
    pub category: String,
}

impl RecordView {
    pub fn of(record: &CredentialRecord, panic_mode: bool, mask: &str) -> Self {
        let fields = &record.fields;
        let (username, secret) = if panic_mode {
            (mask.to_string(), mask.to_string())
        } else {
            (fields.username.clone(), fields.secret().to_string())
        };

        Self {
            id: record.id.clone(),
            service: fields.service.clone(),
            username,
            secret,
            url: fields.url.clone(),
            note: fields.note.clone(),
            category: fields.category.clone(),
        }
    }
}
