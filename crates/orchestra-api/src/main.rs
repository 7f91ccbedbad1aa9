//! Orchestra CLI entry point.
//!
//! Binary name: `orchestra`
//!
//! Parses CLI arguments, sets up tracing, loads configuration, then dispatches
//! to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use orchestra_observe::tracing_setup::{default_filter, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(default_filter(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need configuration
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "orchestra", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.config.as_deref()).await;

    let outcome = match cli.command {
        Commands::Run(args) => cli::run::run_plan(&state, args, cli.json, cli.quiet).await,
        Commands::Cards => cli::cards::list_cards(&state, cli.json).await,
        Commands::Completions { .. } => Ok(()),
    };

    shutdown_tracing();
    outcome
}
