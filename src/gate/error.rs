// Dory: Gate error types

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("Symbol alphabet is empty")]
    EmptyAlphabet,

    #[error("Symbol appears more than once in the alphabet: {0}")]
    DuplicateSymbol(String),

    #[error("Alphabet has {actual} symbols, a pattern needs at least {required}")]
    AlphabetTooSmall { required: usize, actual: usize },

    #[error("Pattern must have exactly {expected} symbols, got {actual}")]
    PatternLength { expected: usize, actual: usize },

    #[error("Invalid pattern digest: {0}")]
    InvalidDigest(String),
}
