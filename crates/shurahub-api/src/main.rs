//! Shurahub CLI and server entry point.
//!
//! Binary name: `shurahub`
//!
//! Parses CLI arguments, sets up tracing, loads configuration and dispatches
//! to the command handler or starts the websocket/REST server.

mod cli;
mod http;
mod session;
mod state;
#[cfg(test)]
mod testing;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use shurahub_observe::tracing_setup::{init_tracing, shutdown_tracing};
use state::{AppState, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over the verbosity flags.
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,shurahub=debug",
        _ => "trace",
    };
    init_tracing(cli.otel, filter).map_err(|e| anyhow::anyhow!(e))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "shurahub", &mut std::io::stdout());
        }

        Commands::History { limit, user } => {
            let storage = Storage::open().await?;
            cli::history::history(&storage, limit, user.as_deref(), cli.json).await?;
        }

        Commands::Ask {
            question,
            visitor,
            no_log,
        } => {
            let state = AppState::init().await?;
            let visitor = if no_log { None } else { Some(visitor) };
            cli::ask::ask(&state, &question, visitor, cli.json).await?;
        }

        Commands::Serve { port, host } => {
            let state = AppState::init().await?;
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            tracing::info!(
                %addr,
                models = ?state.orchestrator.pool().models(),
                data_dir = %state.data_dir.display(),
                "server starting"
            );
            if !cli.quiet {
                println!(
                    "  {} Shurahub listening on {}",
                    console::style("⚖").bold(),
                    console::style(format!("ws://{addr}/ws")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
