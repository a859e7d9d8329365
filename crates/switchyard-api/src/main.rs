//! Switchyard CLI and HTTP entry point.
//!
//! Binary name: `syard`
//!
//! Parses CLI arguments, loads configuration, wires the bus, lifecycle
//! manager and route dispatcher, then runs the requested command.

mod cli;
mod http;
mod state;

use clap::Parser;
use console::style;
use switchyard_infra::config::{load_config, resolve_config_path};
use switchyard_types::config::SwitchyardConfig;

use cli::{Cli, Commands};
use state::AppState;

/// One event loop per process: the bus, the components and the HTTP server
/// all share a single-threaded runtime.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config.clone());
    let loaded = load_config(&config_path).await;

    // The `[logging]` section picks the subscriber, so problems found while
    // loading are replayed once it is installed.
    let filter = switchyard_observe::verbosity_filter(cli.verbose, cli.quiet);
    switchyard_observe::init_tracing(filter, loaded.config.logging.json, loaded.config.logging.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing: {e}"))?;
    loaded.log_warnings();
    tracing::debug!(path = %config_path.display(), "configuration resolved");

    let mut config = loaded.config;

    let result = match cli.command {
        Commands::Routes => {
            // Route listing needs no deployed components.
            let state = AppState::new(config)?;
            cli::routes::print_routes(&state.dispatcher.routes(), cli.json)
        }

        Commands::Deployments => {
            let state = AppState::init(config).await?;
            cli::deployments::print_deployments(&state.manager.deployments(), cli.json)
        }

        Commands::Serve { port, host } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config, cli.quiet).await
        }
    };

    switchyard_observe::shutdown_tracing();
    result
}

async fn serve(config: SwitchyardConfig, quiet: bool) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::init(config).await?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");

    if !quiet {
        println!(
            "  {} Switchyard listening on {}",
            style("⚡").bold(),
            style(format!("http://{addr}")).cyan()
        );
        println!("  {}", style("Press Ctrl+C to stop").dim());
    }

    let router = http::router::build_router(state.clone());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(diagnostics = ?state.diagnostics.snapshot(), "server stopped");

    if !quiet {
        println!("\n  Server stopped.");
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
