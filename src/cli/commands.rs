// Dory: CLI Command Handlers
//
// Each function handles one CLI subcommand. `session` wires the configured
// HTTP record store into a vault and hands it to the terminal loop.

use tokio::io::BufReader;

use crate::config::Config;
use crate::error::DoryError;
use crate::gate::{HashedPattern, Symbol, PATTERN_LEN};
use crate::store::HttpRecordStore;
use crate::vault::Vault;

use super::terminal::Terminal;
use super::{Cli, Commands};

/// Execute the parsed CLI command.
pub async fn execute(cli: Cli) -> Result<(), DoryError> {
    let config = Config::load(cli.config.as_deref(), cli.endpoint)?;

    match cli.command.unwrap_or(Commands::Session) {
        Commands::Session => cmd_session(config).await,
        Commands::Config => cmd_config(&config),
        Commands::HashPattern { symbols } => cmd_hash_pattern(&config, symbols),
    }
}

// ─── Session ─────────────────────────────────────────────────────────────────

async fn cmd_session(config: Config) -> Result<(), DoryError> {
    let store = HttpRecordStore::from_config(&config)?;
    tracing::info!(endpoint = %store.endpoint(), "Starting session");

    let mut vault = Vault::from_config(&config, store)?;
    let mut terminal = Terminal::new(BufReader::new(tokio::io::stdin()), std::io::stdout());
    terminal.run(&mut vault).await?;

    // Leave nothing unlocked behind, even on end of input.
    vault.logout().await;
    println!("Bye.");
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

fn cmd_config(config: &Config) -> Result<(), DoryError> {
    let source = Config::default_path()
        .filter(|p| p.exists())
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(built-in defaults)".to_string());

    println!("Effective configuration:\n");
    println!("  Default file:    {}", source);
    println!("  Endpoint:        {}", config.endpoint);
    println!("  Display name:    {}", config.display_name);
    println!("  Symbols ({:>2}):    {}", config.symbols.len(), config.symbols.join(" "));
    println!("  Pattern digest:  {}", truncated_digest(&config.pattern_digest));
    println!("  Settle delay:    {} ms", config.settle_delay_ms);
    println!("  Request timeout: {} s", config.request_timeout_secs);
    println!("  Mask:            {}", config.mask);

    Ok(())
}

fn truncated_digest(hex: &str) -> String {
    let prefix: String = hex.chars().take(8).collect();
    format!("{}…", prefix)
}

// ─── Hash pattern ────────────────────────────────────────────────────────────

fn cmd_hash_pattern(config: &Config, symbols: Vec<String>) -> Result<(), DoryError> {
    if symbols.len() != PATTERN_LEN {
        return Err(DoryError::Other(format!(
            "A pattern has exactly {} symbols, got {}",
            PATTERN_LEN,
            symbols.len()
        )));
    }

    let pattern: Vec<Symbol> = symbols.into_iter().map(Symbol::from).collect();
    let alphabet = config.alphabet();
    for symbol in pattern.iter().filter(|s| !alphabet.contains(s)) {
        tracing::warn!(%symbol, "Symbol is not part of the configured alphabet");
    }

    let verifier = HashedPattern::from_symbols(&pattern)?;
    println!("{}", verifier.digest().to_hex());
    println!();
    println!("Store this value as `pattern_digest` in your config file.");

    Ok(())
}
