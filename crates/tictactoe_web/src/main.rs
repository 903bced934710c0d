//! Tic-tac-toe web server binary.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use tictactoe_web::{AppState, ServerConfig, router};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, host, port } => run_server(config, host, port).await,
        Command::DefaultConfig => print_default_config(),
    }
}

/// Run the HTTP game server
async fn run_server(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let config = load_config(config_path)?
        .with_port_env(std::env::var("PORT").ok())?
        .with_overrides(host, port);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();

    info!(?config, "Starting tic-tac-toe server");

    let app = router(AppState::from_config(&config));
    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!("Server ready at http://{}:{}/", config.host(), config.port());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<ServerConfig> {
    match path {
        Some(path) => Ok(ServerConfig::from_file(&path)?),
        None => Ok(ServerConfig::default()),
    }
}

/// Print the default configuration
fn print_default_config() -> Result<()> {
    print!("{}", ServerConfig::default().to_toml()?);
    Ok(())
}

#[instrument]
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            tracing::warn!(error = %e, "Could not listen for Ctrl+C, running until killed");
            std::future::pending::<()>().await
        }
    }
}
