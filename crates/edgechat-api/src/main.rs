//! edgechat CLI and REST API entry point.
//!
//! Binary name: `edgechat`
//!
//! Parses CLI arguments, initializes tracing, the database and the
//! completion provider, then dispatches to a command handler or starts the
//! REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;

use cli::{Cli, Commands};
use edgechat_observe::tracing_setup::{filter_for_verbosity, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(filter_for_verbosity(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::init(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Serve {
            port,
            host,
            sweep_interval_secs,
        } => {
            cli::serve::serve(state, &host, port, sweep_interval_secs).await?;
        }

        Commands::History { session_id } => {
            cli::history::show_history(&state, &session_id, cli.json).await?;
        }

        Commands::Sweep { client } => {
            cli::sweep::sweep(&state, client.as_deref(), cli.json).await?;
        }

        Commands::Health => {
            cli::health::health(&state, cli.json).await?;
        }
    }

    Ok(())
}
