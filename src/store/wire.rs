// Dory: Record Store Wire Format
//
// Write requests are one JSON object: { action, ...fields, rowId? }.
//   create → every field, no rowId
//   update → every field plus rowId
//   delete → rowId only
//
// The store has no structured reply for writes. Whatever body comes back is
// interpreted leniently: a recognisable acknowledgement confirms the write,
// a recognisable failure rejects it, anything else means "sent, unconfirmed".

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::{RecordFields, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        })
    }
}

/// One write against the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create(RecordFields),
    Update { id: RecordId, fields: RecordFields },
    Delete { id: RecordId },
}

impl Mutation {
    pub fn action(&self) -> Action {
        match self {
            Mutation::Create(_) => Action::Create,
            Mutation::Update { .. } => Action::Update,
            Mutation::Delete { .. } => Action::Delete,
        }
    }

    pub fn record_id(&self) -> Option<&RecordId> {
        match self {
            Mutation::Create(_) => None,
            Mutation::Update { id, .. } | Mutation::Delete { id } => Some(id),
        }
    }

    pub(crate) fn request(&self) -> WriteRequest<'_> {
        let fields = match self {
            Mutation::Create(fields) | Mutation::Update { fields, .. } => Some(fields),
            Mutation::Delete { .. } => None,
        };
        WriteRequest {
            action: self.action(),
            fields,
            row_id: self.record_id(),
        }
    }
}

/// The serialized body of a write.
#[derive(Debug, Serialize)]
pub(crate) struct WriteRequest<'a> {
    action: Action,
    #[serde(flatten)]
    fields: Option<&'a RecordFields>,
    #[serde(rename = "rowId", skip_serializing_if = "Option::is_none")]
    row_id: Option<&'a RecordId>,
}

/// What the transport could observe about a write that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAck {
    /// The store explicitly acknowledged the write.
    Confirmed,
    /// The request went out but nothing in the reply confirms it was applied.
    Dispatched,
}

const SUCCESS_WORDS: &[&str] = &["ok", "success", "created", "updated", "deleted", "done"];
const FAILURE_WORDS: &[&str] = &["error", "fail", "failed", "failure"];

/// Interpret the body of a 2xx write reply. `Err` carries a rejection reason.
pub(crate) fn interpret_write_reply(body: &str) -> Result<WriteAck, String> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(WriteAck::Dispatched);
    }

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return Ok(WriteAck::Dispatched),
    };
    let Some(object) = value.as_object() else {
        return Ok(WriteAck::Dispatched);
    };

    let reason = || {
        ["error", "message"]
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str))
            .unwrap_or("store reported a failure")
            .to_string()
    };

    if let Some(ok) = object.get("ok").and_then(Value::as_bool) {
        return if ok { Ok(WriteAck::Confirmed) } else { Err(reason()) };
    }

    if let Some(error) = object.get("error") {
        if !error.is_null() && error != &Value::Bool(false) {
            return Err(match error {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            });
        }
    }

    for key in ["status", "result"] {
        if let Some(word) = object.get(key).and_then(Value::as_str) {
            let word = word.to_ascii_lowercase();
            if SUCCESS_WORDS.contains(&word.as_str()) {
                return Ok(WriteAck::Confirmed);
            }
            if FAILURE_WORDS.contains(&word.as_str()) {
                return Err(reason());
            }
        }
    }

    Ok(WriteAck::Dispatched)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
