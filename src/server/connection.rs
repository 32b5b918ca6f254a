//! Client connection handling

use crate::protocol::{deserialize, serialize, write_message, Request, Response, PROTOCOL_VERSION};
use anyhow::{anyhow, Result};
use tokio::net::unix::OwnedWriteHalf;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Represents a connected client
pub struct ClientConnection {
    /// Unique client identifier
    id: Uuid,

    /// Channel to send messages to this client
    sender: mpsc::Sender<Response>,
}

impl ClientConnection {
    /// Create a new client connection
    pub fn new(sender: mpsc::Sender<Response>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
        }
    }

    /// Get client ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Send a message to the client
    pub async fn send(&self, msg: Response) -> Result<()> {
        self.sender
            .send(msg)
            .await
            .map_err(|_| anyhow!("Failed to send message to client {}", self.id))
    }
}

/// Task to write outgoing messages to the client
pub async fn client_writer_task(
    mut writer: OwnedWriteHalf,
    mut receiver: mpsc::Receiver<Response>,
) {
    while let Some(msg) = receiver.recv().await {
        match serialize(&msg) {
            Ok(payload) => {
                if let Err(e) = write_message(&mut writer, &payload).await {
                    tracing::error!("Failed to write message to client: {}", e);
                    break;
                }
            }
            Err(e) => {
                tracing::error!("Failed to serialize message: {}", e);
            }
        }
    }

    tracing::debug!("Client writer task finished");
}

/// Parse a client request from bytes
pub fn parse_request(bytes: &[u8]) -> Result<Request> {
    deserialize(bytes)
}

/// Create a welcome message for a new client
pub fn create_welcome_message(server_id: Uuid) -> Response {
    Response::Welcome {
        server_id,
        protocol_version: PROTOCOL_VERSION,
    }
}

/// Create an error message
pub fn create_error_message(message: String) -> Response {
    Response::Error { message }
}
