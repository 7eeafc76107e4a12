// Dory: Record Store Client
//
// Two remote operations against one endpoint: `list` (GET, JSON array back)
// and `mutate` (POST, action-tagged JSON body). No retries; a failed call is
// reported once and the caller decides what to keep.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::config::Config;

use super::wire::interpret_write_reply;
use super::{CredentialRecord, Mutation, StoreError, WriteAck};

/// The reference store accepts its body as plain text and parses it itself.
const WRITE_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the remote record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch every record. A failure means "no change", never "empty".
    async fn list(&self) -> Result<Vec<CredentialRecord>, StoreError>;

    /// Send one write and report what the transport could observe about it.
    async fn mutate(&self, mutation: &Mutation) -> Result<WriteAck, StoreError>;
}

// ─── HTTP Implementation ─────────────────────────────────────────────────────

pub struct HttpRecordStore {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpRecordStore {
    /// Build a store client with its own connection pool.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dory/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(endpoint, client))
    }

    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        Self::new(config.endpoint.clone(), config.request_timeout())
    }

    /// Use a pre-built `reqwest::Client`.
    pub fn with_client(endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn list(&self) -> Result<Vec<CredentialRecord>, StoreError> {
        let response = self.client.get(&self.endpoint).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let records: Vec<CredentialRecord> =
            serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))?;

        tracing::debug!(count = records.len(), "Fetched record list");
        Ok(records)
    }

    async fn mutate(&self, mutation: &Mutation) -> Result<WriteAck, StoreError> {
        let action = mutation.action();
        let body = serde_json::to_string(&mutation.request())
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        tracing::debug!(
            %action,
            record_id = %mutation.record_id().map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
            "Dispatching write"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, WRITE_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status(status.as_u16()));
        }

        let reply = response.text().await?;
        interpret_write_reply(&reply).map_err(|reason| StoreError::Rejected { action, reason })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
