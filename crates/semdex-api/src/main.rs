//! semdex CLI and REST API entry point.
//!
//! Binary name: `semdex`
//!
//! Parses CLI arguments, opens the embedding store, then dispatches to the
//! appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use semdex_infra::config::resolve_data_dir;
use semdex_observe::tracing_setup::{init_tracing, shutdown_tracing};
use semdex_types::embedding::IndexOptions;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.tracing_options())
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "semdex", &mut std::io::stdout());
        return Ok(());
    }

    let data_dir = cli.data_dir.clone().unwrap_or_else(resolve_data_dir);
    let state = AppState::init(data_dir).await?;

    match cli.command {
        Commands::Store {
            item_type,
            item_id,
            text,
        } => {
            cli::embedding::store(&state, &item_type, &item_id, &text, cli.json).await?;
        }

        Commands::Search {
            text,
            item_type,
            item_id,
            top_k,
            include_self,
        } => {
            cli::search::search(&state, text, item_type, item_id, top_k, include_self, cli.json)
                .await?;
        }

        Commands::Show { item_type, item_id } => {
            cli::embedding::show(&state, &item_type, &item_id, cli.json).await?;
        }

        Commands::Stats => {
            cli::stats::stats(&state, cli.json).await?;
        }

        Commands::Index {
            item_type,
            file,
            force,
            clear,
        } => {
            let options = IndexOptions {
                force,
                clear_first: clear,
            };
            cli::index::index(&state, &item_type, &file, options, cli.json).await?;
        }

        Commands::Purge {
            item_type,
            id_pattern,
            force,
        } => {
            cli::embedding::purge(&state, item_type, id_pattern, force, cli.json).await?;
        }

        Commands::Serve { port, host } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} semdex API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}/api/v1")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
