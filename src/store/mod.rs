// Dory: Store Module
//
// Client side of the remote record store. The store is a single HTTP
// endpoint: GET returns every record as a JSON array, POST takes an
// action-tagged JSON body. The remote side is the only source of truth.

mod client;
mod error;
mod models;
mod wire;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{HttpRecordStore, RecordStore};
pub use error::StoreError;
pub use models::{CredentialRecord, RecordFields, RecordId};
pub use wire::{Action, Mutation, WriteAck};
