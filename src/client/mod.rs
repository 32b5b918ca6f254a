//! Client side of the command socket: connect, send one request, render the reply

use crate::protocol::{receive, send, Request, Response, PROTOCOL_VERSION};
use anyhow::{anyhow, bail, Result};
use std::path::Path;
use tokio::net::UnixStream;
use uuid::Uuid;

/// A connection to a running farming server
pub struct FarmingClient {
    stream: UnixStream,
    server_id: Uuid,
}

impl FarmingClient {
    /// Connect and complete the Welcome/Hello handshake
    pub async fn connect(socket_path: &Path) -> Result<Self> {
        let mut stream = UnixStream::connect(socket_path)
            .await
            .map_err(|e| anyhow!("Cannot reach farming server at {:?}: {}", socket_path, e))?;

        let server_id = match receive::<_, Response>(&mut stream).await? {
            Some(Response::Welcome {
                server_id,
                protocol_version,
            }) => {
                if protocol_version != PROTOCOL_VERSION {
                    bail!(
                        "Server speaks protocol {}, client speaks {}",
                        protocol_version,
                        PROTOCOL_VERSION
                    );
                }
                server_id
            }
            Some(other) => bail!("Expected Welcome, got {:?}", other),
            None => bail!("Server closed the connection"),
        };

        let mut client = Self { stream, server_id };
        match client
            .request(Request::Hello {
                protocol_version: PROTOCOL_VERSION,
            })
            .await?
        {
            Response::Ack { .. } => {}
            Response::Error { message } => bail!(message),
            other => bail!("Unexpected handshake reply: {:?}", other),
        }

        tracing::debug!("Connected to server {}", server_id);
        Ok(client)
    }

    pub fn server_id(&self) -> Uuid {
        self.server_id
    }

    /// Send a request and wait for its response
    pub async fn request(&mut self, request: Request) -> Result<Response> {
        send(&mut self.stream, &request).await?;
        receive(&mut self.stream)
            .await?
            .ok_or_else(|| anyhow!("Server closed the connection"))
    }
}

/// Plain-text lines describing a response
pub fn render(response: &Response) -> Vec<String> {
    match response {
        Response::Welcome { server_id, .. } => vec![format!("Connected to {}", server_id)],
        Response::Pong { timestamp } => {
            let at = chrono::DateTime::from_timestamp_millis(*timestamp)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| timestamp.to_string());
            vec![format!("Server alive ({})", at)]
        }
        Response::Created { code } => {
            vec![format!("Farming session created with code: {}", code)]
        }
        Response::Joined { code, nickname } => {
            vec![format!("You joined farming {} as {}.", code, nickname)]
        }
        Response::Closed { code } => vec![format!("Farming session {} has been closed.", code)],
        Response::Roster(snapshot) => {
            let mut lines = vec![
                format!("Farming session {}", snapshot.code),
                format!("Status: {}", snapshot.status.as_str().to_uppercase()),
            ];
            if snapshot.participants.is_empty() {
                lines.push("No participants yet.".to_string());
            } else {
                lines.extend(
                    snapshot
                        .participants
                        .iter()
                        .map(|p| format!("{} - {}", p.user_id, p.nickname)),
                );
            }
            lines
        }
        Response::Order { code, nicknames } => {
            let mut lines = vec![format!("Random farming order for {}", code)];
            lines.extend(
                nicknames
                    .iter()
                    .enumerate()
                    .map(|(i, nick)| format!("{}. {}", i + 1, nick)),
            );
            lines
        }
        Response::Rejected { message } | Response::Failed { message } => {
            vec![message.clone()]
        }
        Response::Ack { for_command } => vec![format!("{} acknowledged", for_command)],
        Response::Error { message } => vec![format!("Error: {}", message)],
    }
}

/// Whether a response reports that the request did not succeed
pub fn is_failure(response: &Response) -> bool {
    matches!(
        response,
        Response::Rejected { .. } | Response::Failed { .. } | Response::Error { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Participant, SessionSnapshot, SessionStatus};

    #[test]
    fn test_render_order_is_numbered() {
        let lines = render(&Response::Order {
            code: "1234567890".to_string(),
            nicknames: vec!["Bob".to_string(), "Alice".to_string()],
        });
        assert_eq!(lines[1], "1. Bob");
        assert_eq!(lines[2], "2. Alice");
    }

    #[test]
    fn test_render_empty_roster() {
        let lines = render(&Response::Roster(SessionSnapshot {
            code: "1234567890".to_string(),
            creator_id: "mod".to_string(),
            status: SessionStatus::Closed,
            participants: vec![],
        }));
        assert_eq!(lines[1], "Status: CLOSED");
        assert_eq!(lines[2], "No participants yet.");
    }

    #[test]
    fn test_render_roster_entries() {
        let lines = render(&Response::Roster(SessionSnapshot {
            code: "1234567890".to_string(),
            creator_id: "mod".to_string(),
            status: SessionStatus::Open,
            participants: vec![Participant {
                user_id: "u1".to_string(),
                nickname: "Alice".to_string(),
            }],
        }));
        assert_eq!(lines[2], "u1 - Alice");
    }

    #[test]
    fn test_failures_detected() {
        assert!(is_failure(&Response::Rejected {
            message: "no".to_string()
        }));
        assert!(!is_failure(&Response::Closed {
            code: "1234567890".to_string()
        }));
    }
}
