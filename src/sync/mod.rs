// Dory: Sync Module
//
// Sequences every write with an authoritative refresh of the cached record
// list, since the store offers no read-after-write guarantee.

mod controller;

pub use controller::{MutationReport, RefreshOutcome, SyncController};
