// Dory: Sequence Authenticator
//
// Collects up to PATTERN_LEN symbols and hands a complete attempt to the
// verifier. Any failure or manual reset clears the attempt and reshuffles the
// pool. There is no lockout or attempt counting.
//
//   Idle ──select──▶ Collecting ──select──▶ Ready ──confirm──▶ Authenticated
//    ▲                                         │
//    └───────────── mismatch / reset ──────────┘

use super::{PatternVerifier, Symbol, SymbolPool, PATTERN_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    /// No symbols chosen.
    Idle,
    /// Between 1 and PATTERN_LEN - 1 symbols chosen.
    Collecting,
    /// A full attempt is waiting for `confirm()`.
    Ready,
    Authenticated,
}

/// Result of `confirm()`. A mismatch is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Granted,
    Mismatch,
    /// Called before the attempt was complete, or after authentication.
    NotReady,
}

pub struct Authenticator {
    pool: SymbolPool,
    verifier: Box<dyn PatternVerifier>,
    attempt: Vec<Symbol>,
    authenticated: bool,
    failed: bool,
}

impl Authenticator {
    pub fn new(pool: SymbolPool, verifier: Box<dyn PatternVerifier>) -> Self {
        Self {
            pool,
            verifier,
            attempt: Vec::with_capacity(PATTERN_LEN),
            authenticated: false,
            failed: false,
        }
    }

    pub fn phase(&self) -> AuthPhase {
        if self.authenticated {
            return AuthPhase::Authenticated;
        }
        match self.attempt.len() {
            0 => AuthPhase::Idle,
            n if n < PATTERN_LEN => AuthPhase::Collecting,
            _ => AuthPhase::Ready,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// The in-progress attempt.
    pub fn attempt(&self) -> &[Symbol] {
        &self.attempt
    }

    pub fn pool(&self) -> &SymbolPool {
        &self.pool
    }

    /// True after a mismatch, until the next selection or reset.
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Append one symbol. Returns false (and changes nothing) when the attempt
    /// is already full, the session is authenticated, or the symbol is not
    /// part of the alphabet.
    pub fn select_symbol(&mut self, symbol: &Symbol) -> bool {
        if self.authenticated || self.attempt.len() >= PATTERN_LEN {
            return false;
        }
        if !self.pool.contains(symbol) {
            tracing::debug!("Ignoring symbol outside the alphabet");
            return false;
        }
        self.attempt.push(symbol.clone());
        self.failed = false;
        true
    }

    /// Append the symbol shown at a presented position.
    pub fn select_position(&mut self, position: usize) -> bool {
        match self.pool.at(position).cloned() {
            Some(symbol) => self.select_symbol(&symbol),
            None => false,
        }
    }

    pub fn confirm(&mut self) -> AuthOutcome {
        if self.phase() != AuthPhase::Ready {
            return AuthOutcome::NotReady;
        }

        if self.verifier.verify(&self.attempt) {
            self.attempt.clear();
            self.authenticated = true;
            self.failed = false;
            tracing::info!("Pattern accepted");
            AuthOutcome::Granted
        } else {
            self.attempt.clear();
            self.pool.reshuffle();
            self.failed = true;
            tracing::info!("Pattern rejected");
            AuthOutcome::Mismatch
        }
    }

    /// Clear the attempt and present a fresh layout. Ignored once authenticated.
    pub fn reset(&mut self) -> bool {
        if self.authenticated {
            return false;
        }
        self.attempt.clear();
        self.failed = false;
        self.pool.reshuffle();
        true
    }

    /// Leave the authenticated state. Returns false if not authenticated.
    pub fn logout(&mut self) -> bool {
        if !self.authenticated {
            return false;
        }
        self.authenticated = false;
        self.attempt.clear();
        self.failed = false;
        self.pool.reshuffle();
        tracing::info!("Logged out");
        true
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("phase", &self.phase())
            .field("attempt_len", &self.attempt.len())
            .field("failed", &self.failed)
            .field("generation", &self.pool.generation())
            .finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
