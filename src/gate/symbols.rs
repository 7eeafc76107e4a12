// Dory: Symbol Pool & Shuffler
//
// The pool owns the fixed alphabet and the order in which it is currently
// presented. Every reshuffle bumps a generation counter so a rendering layer
// can tell that the layout changed.

use std::collections::HashSet;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{GateError, PATTERN_LEN};

/// One selectable display token of the authentication alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Symbol {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// Fisher–Yates shuffle into a fresh vector; `symbols` is left untouched.
pub fn shuffle<R: Rng>(symbols: &[Symbol], rng: &mut R) -> Vec<Symbol> {
    let mut shuffled = symbols.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.random_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled
}

/// The alphabet plus its currently presented layout.
#[derive(Debug, Clone)]
pub struct SymbolPool {
    alphabet: Vec<Symbol>,
    presented: Vec<Symbol>,
    generation: u64,
}

impl SymbolPool {
    /// Build a pool and produce the first presentation.
    pub fn new(alphabet: Vec<Symbol>) -> Result<Self, GateError> {
        Self::with_rng(alphabet, &mut rand::rng())
    }

    pub fn with_rng<R: Rng>(alphabet: Vec<Symbol>, rng: &mut R) -> Result<Self, GateError> {
        if alphabet.is_empty() {
            return Err(GateError::EmptyAlphabet);
        }
        if alphabet.len() < PATTERN_LEN {
            return Err(GateError::AlphabetTooSmall {
                required: PATTERN_LEN,
                actual: alphabet.len(),
            });
        }

        let mut seen = HashSet::with_capacity(alphabet.len());
        for symbol in &alphabet {
            if !seen.insert(symbol) {
                return Err(GateError::DuplicateSymbol(symbol.to_string()));
            }
        }

        let presented = shuffle(&alphabet, rng);
        Ok(Self {
            alphabet,
            presented,
            generation: 1,
        })
    }

    /// The alphabet in its canonical (configured) order.
    pub fn alphabet(&self) -> &[Symbol] {
        &self.alphabet
    }

    /// The layout a rendering layer should show right now.
    pub fn presented(&self) -> &[Symbol] {
        &self.presented
    }

    /// Symbol at a presented position, if any.
    pub fn at(&self, position: usize) -> Option<&Symbol> {
        self.presented.get(position)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.alphabet.contains(symbol)
    }

    /// How many layouts have been produced so far (starts at 1).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn reshuffle(&mut self) {
        self.reshuffle_with(&mut rand::rng());
    }

    pub fn reshuffle_with<R: Rng>(&mut self, rng: &mut R) {
        self.presented = shuffle(&self.alphabet, rng);
        self.generation += 1;
        tracing::debug!(generation = self.generation, "Symbol layout reshuffled");
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
