// Dory: CLI Module
//
// Command-line interface using clap derive macros.
// Subcommands: session (default), config, hash-pattern.

mod commands;
mod terminal;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::execute;

/// Dory: a symbol-gated credential dashboard over a remote record store.
#[derive(Parser, Debug)]
#[command(name = "dory")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON config file (default: <config_dir>/dory/config.json).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Record store endpoint; overrides the config file and DORY_ENDPOINT.
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Open the interactive gate and dashboard (default).
    Session,

    /// Print the effective configuration.
    Config,

    /// Print the digest to store as `pattern_digest` for a new secret pattern.
    HashPattern {
        /// The pattern symbols, in order.
        #[arg(required = true)]
        symbols: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_session() {
        let cli = Cli::try_parse_from(["dory"]).unwrap();
        assert_eq!(cli.command, None);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["dory", "config", "--endpoint", "https://x.example/exec"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Config));
        assert_eq!(cli.endpoint.as_deref(), Some("https://x.example/exec"));
    }

    #[test]
    fn test_hash_pattern_requires_symbols() {
        assert!(Cli::try_parse_from(["dory", "hash-pattern"]).is_err());
        let cli = Cli::try_parse_from(["dory", "hash-pattern", "B", "D", "A", "C"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::HashPattern {
                symbols: vec!["B".into(), "D".into(), "A".into(), "C".into()]
            })
        );
    }
}
