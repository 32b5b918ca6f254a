//! Unix socket listener and server main loop

use super::connection::{
    client_writer_task, create_error_message, create_welcome_message, parse_request,
    ClientConnection,
};
use super::dispatch::{process_request, RoleGate, ServerContext};
use crate::protocol::{read_message, Response};
use crate::session::SessionService;
use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, Notify};
use uuid::Uuid;

/// Unix socket server hosting one [`SessionService`]
pub struct ServerListener {
    socket_path: PathBuf,
    context: Arc<ServerContext>,
}

impl ServerListener {
    /// Create a new server listener
    pub fn new(socket_path: PathBuf, service: Arc<SessionService>, gate: RoleGate) -> Self {
        Self {
            socket_path,
            context: Arc::new(ServerContext {
                server_id: Uuid::new_v4(),
                service,
                gate,
                shutdown: Notify::new(),
            }),
        }
    }

    /// Get the socket path
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Identifier announced to clients in the welcome message
    pub fn server_id(&self) -> Uuid {
        self.context.server_id
    }

    /// Run the server until `shutdown_rx` fires or a client requests shutdown
    pub async fn run(&self, mut shutdown_rx: mpsc::Receiver<()>) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Remove stale socket if it exists
        if self.socket_path.exists() {
            match UnixStream::connect(&self.socket_path).await {
                Ok(_) => {
                    return Err(anyhow!(
                        "Server already running on {:?}",
                        self.socket_path
                    ));
                }
                Err(_) => {
                    tracing::info!("Removing stale socket: {:?}", self.socket_path);
                    std::fs::remove_file(&self.socket_path)?;
                }
            }
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        tracing::info!("Server listening on {:?}", self.socket_path);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }

                _ = self.context.shutdown.notified() => {
                    tracing::info!("Shutdown requested by client");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, _addr)) => {
                            let context = Arc::clone(&self.context);
                            tokio::spawn(async move {
                                if let Err(e) = handle_client(stream, context).await {
                                    tracing::error!("Client error: {}", e);
                                }
                            });
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }
            }
        }

        self.cleanup();

        Ok(())
    }

    /// Clean up server resources
    fn cleanup(&self) {
        tracing::info!("Cleaning up server resources");

        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                tracing::error!("Failed to remove socket file: {}", e);
            }
        }
    }
}

/// Handle a single client connection
async fn handle_client(stream: UnixStream, context: Arc<ServerContext>) -> Result<()> {
    let (mut reader, writer) = stream.into_split();

    let (tx, rx) = mpsc::channel::<Response>(64);
    let client = ClientConnection::new(tx);
    let client_id = client.id();

    tracing::info!("Client connected: {}", client_id);

    let writer_handle = tokio::spawn(client_writer_task(writer, rx));

    client
        .send(create_welcome_message(context.server_id))
        .await?;

    loop {
        match read_message(&mut reader).await {
            Ok(Some(bytes)) => {
                let response = match parse_request(&bytes) {
                    Ok(request) => process_request(request, client_id, &context).await,
                    Err(e) => {
                        tracing::error!("Failed to parse message: {}", e);
                        create_error_message(format!("Invalid message: {}", e))
                    }
                };
                if let Err(e) = client.send(response).await {
                    tracing::error!("Failed to send response: {}", e);
                    break;
                }
            }
            Ok(None) => {
                tracing::info!("Client disconnected: {}", client_id);
                break;
            }
            Err(e) => {
                tracing::error!("Error reading from client: {}", e);
                break;
            }
        }
    }

    // Let the writer flush what is queued, then stop
    drop(client);
    let _ = writer_handle.await;

    tracing::info!("Client handler finished: {}", client_id);

    Ok(())
}
