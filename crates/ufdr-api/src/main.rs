//! UFDR assistant backend entry point.
//!
//! Binary name: `ufdr`
//!
//! Parses CLI arguments, initializes tracing and the shared services, then
//! dispatches to a diagnostic command or starts the HTTP server.

mod cli;
mod http;
mod state;

use clap::Parser;

use cli::{Cli, Commands, EmbedTarget};
use state::AppState;
use ufdr_infra::config::{load_config, resolve_data_dir};
use ufdr_infra::registry::ClientRegistry;
use ufdr_observe::tracing_setup::{init_tracing, shutdown_tracing, TracingOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = TracingOptions::new(cli.log_filter())
        .with_json(cli.log_json)
        .with_otel(cli.otel);
    if let Err(e) = init_tracing(&options) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        // Store check does not need the model loaded.
        Commands::Check => {
            let config = load_config(&resolve_data_dir()).await?;
            let registry = ClientRegistry::new(config);
            cli::check::check(&registry, cli.json).await?;
        }

        Commands::Embed { target } => {
            let state = AppState::init().await?;
            match target {
                EmbedTarget::Text { texts } => {
                    cli::embed::embed_text(&state, texts, cli.json).await?;
                }
                EmbedTarget::Image { sources } => {
                    cli::embed::embed_image(&state, sources, cli.json).await?;
                }
            }
        }

        Commands::Serve { port, host } => {
            let state = AppState::init().await?;

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} UFDR backend listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            tracing::info!(
                data_dir = %state.data_dir.display(),
                collection = %state.config.vector.collection,
                graph = %state.config.graph.uri,
                "serving"
            );
            let router = http::router::build_router(state.clone());

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            state.shutdown().await;
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
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
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
                tracing::error!("failed to install SIGTERM handler: {e}");
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
