// Dory: In-memory record store for unit tests
//
// Applies writes to a Vec, assigns `row-N` ids on create, and records every
// call together with the (possibly paused) tokio clock.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use super::{CredentialRecord, Mutation, RecordFields, RecordId, RecordStore, StoreError, WriteAck};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Mutate(Mutation),
}

pub struct MockRecordStore {
    records: Mutex<Vec<CredentialRecord>>,
    calls: Mutex<Vec<(Call, Instant)>>,
    next_id: AtomicUsize,
    ack: WriteAck,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MockRecordStore {
    pub fn new(ack: WriteAck) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
            ack,
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// A store that never confirms writes, like the reference endpoint.
    pub fn fire_and_forget() -> Self {
        Self::new(WriteAck::Dispatched)
    }

    pub fn with_records(self, records: Vec<CredentialRecord>) -> Self {
        *self.records.lock().unwrap() = records;
        self
    }

    pub fn seed(id: &str, fields: RecordFields) -> CredentialRecord {
        CredentialRecord {
            id: RecordId::from(id),
            fields,
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn timed_calls(&self) -> Vec<(Call, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn records(&self) -> Vec<CredentialRecord> {
        self.records.lock().unwrap().clone()
    }

    fn record_call(&self, call: Call) {
        self.calls.lock().unwrap().push((call, Instant::now()));
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn list(&self) -> Result<Vec<CredentialRecord>, StoreError> {
        self.record_call(Call::List);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Decode("simulated read failure".to_string()));
        }
        Ok(self.records())
    }

    async fn mutate(&self, mutation: &Mutation) -> Result<WriteAck, StoreError> {
        self.record_call(Call::Mutate(mutation.clone()));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Status(503));
        }

        let mut records = self.records.lock().unwrap();
        match mutation {
            Mutation::Create(fields) => {
                let n = self.next_id.fetch_add(1, Ordering::SeqCst);
                records.push(CredentialRecord {
                    id: RecordId::new(format!("row-{}", n)),
                    fields: fields.clone(),
                });
            }
            Mutation::Update { id, fields } => {
                if let Some(record) = records.iter_mut().find(|r| &r.id == id) {
                    record.fields = fields.clone();
                }
            }
            Mutation::Delete { id } => records.retain(|r| &r.id != id),
        }
        Ok(self.ack)
    }
}
