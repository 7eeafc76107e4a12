// Dory: Library root
//
// Symbol gate, record store client, sync controller and the vault session
// that ties them together. The binary in main.rs is a terminal front end.

pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod gate;
pub mod session;
pub mod store;
pub mod sync;
pub mod vault;

pub use error::{DoryError, Result};
