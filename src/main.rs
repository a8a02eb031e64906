//! review-bridge entry point and argv-mode router.
//!
//! Any positional argument selects the CLI; with zero positionals the
//! process serves the tool-call surface on stdio. This keeps an unknown
//! positional from silently hanging a stdio server that nobody is
//! speaking to.

use std::process;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use review_bridge::cli::{self, args::Cli};
use review_bridge::env::Env;
use review_bridge::handlers::AppState;
use review_bridge::server;

#[tokio::main]
async fn main() {
    init_tracing();

    let argv: Vec<String> = std::env::args().collect();
    if is_cli_invocation(&argv) {
        let cli = Cli::parse();
        let code = cli::run(cli, &Env::real()).await;
        process::exit(code);
    }

    if let Err(err) = run_server().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    let state = AppState::init(None, &Env::real()).map_err(|e| anyhow::anyhow!("{e}"))?;
    server::serve(Arc::new(state)).await
}

/// True when argv selects CLI mode: any positional argument, or an
/// explicit help/version flag (which clap answers with exit 0).
fn is_cli_invocation(argv: &[String]) -> bool {
    argv.iter().skip(1).any(|arg| {
        !arg.starts_with('-')
            || arg == "--help"
            || arg == "-h"
            || arg == "--version"
            || arg == "-V"
    })
}

/// Logs go to stderr only; stdout belongs to the tool-call transport.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
