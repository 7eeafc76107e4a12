// Dory: Configuration
//
// Everything has a baked-in default. A JSON file (explicit `--config` path or
// `<config_dir>/dory/config.json`) may override any field, then the
// DORY_ENDPOINT variable, then the `--endpoint` flag.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gate::{GateError, HashedPattern, PatternDigest, Symbol, SymbolPool};

// ─── Constants ───────────────────────────────────────────────────────────────

/// Environment variable overriding the record store endpoint.
pub const ENDPOINT_ENV: &str = "DORY_ENDPOINT";

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8787/exec";
const DEFAULT_DISPLAY_NAME: &str = "Dory";

/// Reference alphabet shown on the gate.
const BASE_SYMBOLS: [&str; 20] = [
    "🐶", "🍎", "🚗", "🍕", "🌈", "👀", "🏀", "🌙", "👧", "🍦", "📚", "🎸", "🦋", "🐈", "🍟", "🌻",
    "🚀", "💎", "🧸", "🔒",
];

/// Digest of the reference pattern; produce a new one with `dory hash-pattern`.
const DEFAULT_PATTERN_DIGEST: &str =
    "432648d03a180892cbb5db4e2bdc09b8f50536261554c38cd6959786d753bc4a";

/// Pause between an unconfirmed write and the read-back refresh.
const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Token shown in place of usernames and secrets while panic mode is active.
pub const DEFAULT_MASK: &str = "********";

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Gate(#[from] GateError),
}

// ─── Config ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Record store endpoint (GET lists, POST writes).
    pub endpoint: String,
    /// Name shown on the gate and in the dashboard header.
    pub display_name: String,
    /// Gate alphabet, in canonical order.
    pub symbols: Vec<String>,
    /// Hex SHA-256 digest of the secret pattern.
    pub pattern_digest: String,
    pub settle_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub mask: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            symbols: BASE_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            pattern_digest: DEFAULT_PATTERN_DIGEST.to_string(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            mask: DEFAULT_MASK.to_string(),
        }
    }
}

impl Config {
    /// `<config_dir>/dory/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|base| base.join("dory").join("config.json"))
    }

    /// Read a config file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit path must exist; the default path is optional.
    pub fn load(explicit: Option<&Path>, endpoint_flag: Option<String>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => {
                    tracing::debug!(path = %path.display(), "Loading config file");
                    Self::from_file(&path)?
                }
                _ => Self::default(),
            },
        };

        let env_endpoint = std::env::var(ENDPOINT_ENV).ok();
        config.apply_endpoint_overrides(env_endpoint, endpoint_flag);
        config.validate()?;
        Ok(config)
    }

    /// Later arguments win. Blank values are ignored.
    pub fn apply_endpoint_overrides(&mut self, env: Option<String>, flag: Option<String>) {
        for endpoint in [env, flag].into_iter().flatten() {
            let endpoint = endpoint.trim();
            if !endpoint.is_empty() {
                self.endpoint = endpoint.to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::Invalid("endpoint must not be empty".to_string()));
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "endpoint must be an http(s) URL, got '{}'",
                endpoint
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be positive".to_string()));
        }

        // Both of these validate the alphabet and digest shape.
        SymbolPool::new(self.alphabet())?;
        self.digest()?;
        Ok(())
    }

    pub fn alphabet(&self) -> Vec<Symbol> {
        self.symbols.iter().map(|s| Symbol::new(s.as_str())).collect()
    }

    pub fn digest(&self) -> Result<PatternDigest, GateError> {
        PatternDigest::from_hex(&self.pattern_digest)
    }

    pub fn verifier(&self) -> Result<HashedPattern, GateError> {
        Ok(HashedPattern::new(self.digest()?))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
