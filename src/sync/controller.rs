// Dory: CRUD Sync Controller
//
// Protocol for one write:
//   loading ↑ → mutate → settle (skipped if the store confirmed) → list → loading ↓
//
// Writes are serialized through a fair tokio mutex, so overlapping calls run
// write/settle/refresh in arrival order and never interleave. Every refresh
// is tagged with the epoch it started under; `invalidate()` (logout) bumps the
// epoch, and a refresh that lands afterwards is discarded.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};

use crate::store::{CredentialRecord, Mutation, RecordId, RecordStore, StoreError, WriteAck};

/// What happened to the cached snapshot after a read-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The snapshot was replaced with this many records.
    Applied(usize),
    /// The read failed; the previous snapshot is still shown.
    Kept,
    /// The session moved on while the read was in flight.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationReport {
    pub ack: WriteAck,
    pub refresh: RefreshOutcome,
}

pub struct SyncController<S> {
    store: S,
    settle_delay: Duration,
    snapshot: RwLock<Vec<CredentialRecord>>,
    write_queue: Mutex<()>,
    epoch: AtomicU64,
    pending: AtomicUsize,
}

/// Keeps `pending` raised for the lifetime of one operation.
struct Busy<'a>(&'a AtomicUsize);

impl<'a> Busy<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<S: RecordStore> SyncController<S> {
    pub fn new(store: S, settle_delay: Duration) -> Self {
        Self {
            store,
            settle_delay,
            snapshot: RwLock::new(Vec::new()),
            write_queue: Mutex::new(()),
            epoch: AtomicU64::new(0),
            pending: AtomicUsize::new(0),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// True while any load or write is in flight.
    pub fn is_loading(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    /// A copy of the last good record list.
    pub async fn snapshot(&self) -> Vec<CredentialRecord> {
        self.snapshot.read().await.clone()
    }

    pub async fn find(&self, id: &RecordId) -> Option<CredentialRecord> {
        self.snapshot.read().await.iter().find(|r| &r.id == id).cloned()
    }

    /// The id of the loaded record displayed as `label`.
    pub async fn resolve(&self, label: &str) -> Option<RecordId> {
        self.snapshot
            .read()
            .await
            .iter()
            .find(|r| r.id.matches(label))
            .map(|r| r.id.clone())
    }

    /// Replace the snapshot with the store's current list.
    pub async fn load(&self) -> RefreshOutcome {
        let _busy = Busy::enter(&self.pending);
        let epoch = self.epoch();
        self.refresh(epoch).await
    }

    /// Write, wait for the store to settle, then refresh.
    ///
    /// A failed write returns the error without refreshing; the remote state
    /// is unknown at that point.
    pub async fn perform_mutation(&self, mutation: Mutation) -> Result<MutationReport, StoreError> {
        let _busy = Busy::enter(&self.pending);
        let epoch = self.epoch();
        let _turn = self.write_queue.lock().await;

        let action = mutation.action();
        let ack = match self.store.mutate(&mutation).await {
            Ok(ack) => ack,
            Err(e) => {
                tracing::error!(%action, error = %e, "Write failed; not refreshing");
                return Err(e);
            }
        };

        if ack == WriteAck::Dispatched && !self.settle_delay.is_zero() {
            tracing::debug!(
                %action,
                delay_ms = self.settle_delay.as_millis() as u64,
                "Write unconfirmed; waiting for the store to settle"
            );
            tokio::time::sleep(self.settle_delay).await;
        }

        let refresh = self.refresh(epoch).await;
        tracing::info!(%action, ?ack, ?refresh, "Write synchronized");
        Ok(MutationReport { ack, refresh })
    }

    /// Forget the snapshot and orphan every in-flight refresh.
    pub async fn invalidate(&self) {
        let previous = self.epoch.fetch_add(1, Ordering::SeqCst);
        self.snapshot.write().await.clear();
        tracing::debug!(epoch = previous + 1, "Sync session invalidated");
    }

    async fn refresh(&self, epoch: u64) -> RefreshOutcome {
        match self.store.list().await {
            Ok(records) => {
                let mut snapshot = self.snapshot.write().await;
                if self.epoch() != epoch {
                    tracing::debug!(epoch, "Discarding refresh from a previous session");
                    return RefreshOutcome::Discarded;
                }
                let count = records.len();
                *snapshot = records;
                RefreshOutcome::Applied(count)
            }
            Err(e) => {
                if self.epoch() != epoch {
                    return RefreshOutcome::Discarded;
                }
                tracing::warn!(error = %e, "Refresh failed; keeping last snapshot");
                RefreshOutcome::Kept
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
