//! CLI command definitions for the `edgechat` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod health;
pub mod history;
pub mod serve;
pub mod sweep;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Rate-limited chat relay in front of an OpenAI-compatible completion API.
#[derive(Parser)]
#[command(name = "edgechat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to `config.toml` in the data directory).
    #[arg(long, global = true, env = "EDGECHAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Export spans to OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Seconds between background sweeps of expired records (0 disables).
        #[arg(long, default_value = "900")]
        sweep_interval_secs: u64,
    },

    /// Print a stored conversation.
    History {
        /// Session ID to display.
        session_id: String,
    },

    /// Delete stale rate limit windows and expired entries.
    Sweep {
        /// Only sweep records of this client.
        #[arg(long)]
        client: Option<String>,
    },

    /// Probe the completion API.
    Health,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["edgechat", "serve"]).unwrap();
        match cli.command {
            Commands::Serve {
                port,
                host,
                sweep_interval_secs,
            } => {
                assert_eq!(port, 3000);
                assert_eq!(host, "127.0.0.1");
                assert_eq!(sweep_interval_secs, 900);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["edgechat", "sweep", "--client", "1.2.3.4", "--json", "-vv"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Sweep { client: Some(ref c) } if c == "1.2.3.4"));
    }

    #[test]
    fn test_history_requires_session_id() {
        assert!(Cli::try_parse_from(["edgechat", "history"]).is_err());
    }
}
