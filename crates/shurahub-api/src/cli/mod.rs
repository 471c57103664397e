//! CLI command definitions for the `shurahub` binary.

pub mod ask;
pub mod history;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Three models debate your question; the last one gives the verdict.
#[derive(Parser)]
#[command(name = "shurahub", version, about, long_about = None)]
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

    /// Export spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the websocket and REST server.
    Serve {
        /// Port to listen on (overrides config).
        #[arg(long, short)]
        port: Option<u16>,

        /// Host address to bind to (overrides config).
        #[arg(long)]
        host: Option<String>,
    },

    /// Run one debate in the terminal.
    Ask {
        /// The question to debate.
        question: String,

        /// Identity the debate is logged under.
        #[arg(long, default_value = "cli")]
        visitor: String,

        /// Do not log the debate.
        #[arg(long)]
        no_log: bool,
    },

    /// List logged debates, newest first.
    History {
        /// Maximum number of debates to show.
        #[arg(long, short, default_value_t = 20)]
        limit: i64,

        /// Only debates logged under this user or visitor id.
        #[arg(long)]
        user: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
