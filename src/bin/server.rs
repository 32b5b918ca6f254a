//! farming-server - background daemon hosting the session service

use anyhow::Result;
use clap::Parser;
use farming::config::Config;
use farming::server::{RoleGate, ServerListener};
use farming::session::{SessionService, SessionStore};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "farming-server")]
#[command(about = "farming session server daemon")]
struct Cli {
    /// Server name
    #[arg(short, long, default_value = "default")]
    name: String,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Socket path override
    #[arg(long)]
    socket: Option<PathBuf>,

    /// Session data file override
    #[arg(long)]
    data_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let data_file = cli
        .data_file
        .unwrap_or_else(|| config.storage.data_file.clone());
    let socket_path = cli
        .socket
        .unwrap_or_else(|| config.socket_path(&cli.name));

    tracing::info!("Starting farming server '{}' with data file {:?}", cli.name, data_file);

    let store = SessionStore::new(data_file);
    // Fail fast on a corrupt file instead of on the first request
    let existing = store.load()?;
    tracing::info!("Loaded {} existing sessions", existing.len());

    let service = Arc::new(
        SessionService::new(store).with_max_code_attempts(config.sessions.max_code_attempts),
    );
    let gate = RoleGate::new(config.auth.privileged_role.clone());
    let listener = ServerListener::new(socket_path, service, gate);

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(()).await;
        }
    });

    listener.run(shutdown_rx).await?;

    tracing::info!("farming server stopped");
    Ok(())
}
