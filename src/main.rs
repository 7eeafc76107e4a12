// Dory: Application Entry Point
//
// Parses CLI arguments, initializes structured logging, and dispatches to the
// command handler. Logs go to stderr so they never interleave with the
// interactive display on stdout.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dory::cli::{execute, Cli};

#[tokio::main]
async fn main() {
    // RUST_LOG=dory=debug for verbose output. No level ever includes secrets.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dory=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = execute(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
