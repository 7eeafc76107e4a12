// Dory: Pattern Verifier
//
// The gate never keeps the secret pattern itself. It keeps a salted SHA-256
// digest over a length-prefixed encoding of the symbols, so two sequences
// share a digest only if they match in length, order and value.
//
// Encoding: SALT || u32le(count) || for each symbol: u32le(len) || utf8 bytes

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::{GateError, Symbol, PATTERN_LEN};

/// Domain separator mixed into every pattern digest.
const PATTERN_SALT: &[u8] = b"dory-pattern-v1";

/// Length of a SHA-256 digest in bytes.
const DIGEST_LEN: usize = 32;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Decides whether a completed attempt matches the secret pattern.
///
/// Implemented locally by [`HashedPattern`]; a remote verifier that sends the
/// attempt to a trusted service can implement the same trait.
pub trait PatternVerifier: Send + Sync {
    fn verify(&self, attempt: &[Symbol]) -> bool;
}

// ─── Digest ──────────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Eq)]
pub struct PatternDigest([u8; DIGEST_LEN]);

impl PatternDigest {
    /// Digest an arbitrary symbol sequence.
    pub fn of(symbols: &[Symbol]) -> Self {
        let mut encoded = Zeroizing::new(Vec::with_capacity(
            PATTERN_SALT.len() + 4 + symbols.iter().map(|s| s.as_str().len() + 4).sum::<usize>(),
        ));
        encoded.extend_from_slice(PATTERN_SALT);
        encoded.extend_from_slice(&(symbols.len() as u32).to_le_bytes());
        for symbol in symbols {
            let bytes = symbol.as_str().as_bytes();
            encoded.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            encoded.extend_from_slice(bytes);
        }

        let hash = Sha256::digest(encoded.as_slice());
        let mut out = [0u8; DIGEST_LEN];
        out.copy_from_slice(&hash);
        Self(out)
    }

    /// Parse the hex form stored in the configuration file.
    pub fn from_hex(hex: &str) -> Result<Self, GateError> {
        let hex = hex.trim();
        if hex.len() != DIGEST_LEN * 2 {
            return Err(GateError::InvalidDigest(format!(
                "expected {} hex characters, got {}",
                DIGEST_LEN * 2,
                hex.len()
            )));
        }

        // from_str_radix accepts a leading '+', so check digits first.
        if let Some(bad) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(GateError::InvalidDigest(format!("'{}' is not a hex digit", bad)));
        }

        let mut out = [0u8; DIGEST_LEN];
        for (i, byte) in out.iter_mut().enumerate() {
            let pair = &hex[i * 2..i * 2 + 2];
            *byte = u8::from_str_radix(pair, 16)
                .map_err(|_| GateError::InvalidDigest(format!("bad hex pair '{}'", pair)))?;
        }
        Ok(Self(out))
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Only a prefix is ever printed.
impl fmt::Debug for PatternDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PatternDigest({}…)", &self.to_hex()[..8])
    }
}

// ─── Local verifier ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct HashedPattern {
    digest: PatternDigest,
}

impl HashedPattern {
    pub fn new(digest: PatternDigest) -> Self {
        Self { digest }
    }

    /// Hash a plaintext pattern once and keep only the digest.
    pub fn from_symbols(pattern: &[Symbol]) -> Result<Self, GateError> {
        if pattern.len() != PATTERN_LEN {
            return Err(GateError::PatternLength {
                expected: PATTERN_LEN,
                actual: pattern.len(),
            });
        }
        Ok(Self::new(PatternDigest::of(pattern)))
    }

    pub fn digest(&self) -> &PatternDigest {
        &self.digest
    }
}

impl PatternVerifier for HashedPattern {
    fn verify(&self, attempt: &[Symbol]) -> bool {
        attempt.len() == PATTERN_LEN && PatternDigest::of(attempt) == self.digest
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(tokens: &[&str]) -> Vec<Symbol> {
        tokens.iter().map(|t| Symbol::from(*t)).collect()
    }

    #[test]
    fn test_exact_match_verifies() {
        let verifier = HashedPattern::from_symbols(&seq(&["B", "D", "A", "C"])).unwrap();
        assert!(verifier.verify(&seq(&["B", "D", "A", "C"])));
    }

    #[test]
    fn test_order_matters() {
        let verifier = HashedPattern::from_symbols(&seq(&["B", "D", "A", "C"])).unwrap();
        assert!(!verifier.verify(&seq(&["B", "D", "C", "A"])));
        assert!(!verifier.verify(&seq(&["C", "A", "D", "B"])));
    }

    #[test]
    fn test_length_mismatch_fails() {
        let verifier = HashedPattern::from_symbols(&seq(&["B", "D", "A", "C"])).unwrap();
        assert!(!verifier.verify(&seq(&["B", "D", "A"])));
        assert!(!verifier.verify(&seq(&["B", "D", "A", "C", "C"])));
        assert!(!verifier.verify(&[]));
    }

    #[test]
    fn test_encoding_is_unambiguous() {
        // Concatenation alone would make these collide.
        assert_ne!(
            PatternDigest::of(&seq(&["AB", "C"])),
            PatternDigest::of(&seq(&["A", "BC"]))
        );
    }

    #[test]
    fn test_from_symbols_requires_full_pattern() {
        let err = HashedPattern::from_symbols(&seq(&["A", "B"])).unwrap_err();
        assert_eq!(
            err,
            GateError::PatternLength {
                expected: PATTERN_LEN,
                actual: 2
            }
        );
    }

    #[test]
    fn test_hex_round_trip_and_known_value() {
        let digest = PatternDigest::of(&seq(&["B", "D", "A", "C"]));
        assert_eq!(
            digest.to_hex(),
            "fef19bd83391ab22c9d4b8c96aa6247db920c772e26847e8289eeca170a5738a"
        );
        assert_eq!(PatternDigest::from_hex(&digest.to_hex()).unwrap(), digest);
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert!(PatternDigest::from_hex("abc").is_err());
        assert!(PatternDigest::from_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn test_from_hex_rejects_signed_pairs() {
        let signed = format!("+f{}", "ab".repeat(31));
        assert_eq!(signed.len(), 64);
        assert!(matches!(
            PatternDigest::from_hex(&signed),
            Err(GateError::InvalidDigest(_))
        ));

        let non_ascii = format!("é{}", "a".repeat(62));
        assert_eq!(non_ascii.len(), 64);
        assert!(PatternDigest::from_hex(&non_ascii).is_err());
    }

    #[test]
    fn test_debug_shows_prefix_only() {
        let digest = PatternDigest::of(&seq(&["B", "D", "A", "C"]));
        let debug = format!("{:?}", digest);
        assert!(debug.contains("fef19bd8"));
        assert!(!debug.contains(&digest.to_hex()));
    }
}
