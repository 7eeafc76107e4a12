// Dory: Gate Module
//
// Pattern-based authentication. The symbol pool is reshuffled on every
// attempt so the spatial layout of a correct pattern never repeats, and the
// authenticator compares attempts through a verifier that only holds a
// salted digest of the secret pattern.

mod authenticator;
mod error;
mod symbols;
mod verifier;

pub use authenticator::{AuthOutcome, AuthPhase, Authenticator};
pub use error::GateError;
pub use symbols::{shuffle, Symbol, SymbolPool};
pub use verifier::{HashedPattern, PatternDigest, PatternVerifier};

/// Number of symbols in a complete pattern.
pub const PATTERN_LEN: usize = 4;
