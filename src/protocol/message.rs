//! Message types for the farming command protocol

use crate::session::SessionSnapshot;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of the user behind a request, as supplied by the chat platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// Opaque platform user id
    pub user_id: String,

    /// Platform role ids held by the user
    pub roles: Vec<String>,
}

impl Caller {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            roles: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Request {
    /// Handshake with protocol version
    Hello { protocol_version: u32 },

    /// Liveness check
    Ping,

    /// Create a new session (privileged)
    Create { caller: Caller },

    /// Join an open session
    Join {
        caller: Caller,
        code: String,
        nickname: String,
    },

    /// Close a session to new joins (privileged)
    Close { caller: Caller, code: String },

    /// Show status and roster
    View { code: String },

    /// Randomized turn order
    List { code: String },

    /// Stop the server (privileged)
    Shutdown { caller: Caller },
}

impl Request {
    /// Command name used in acknowledgements and logs
    pub fn name(&self) -> &'static str {
        match self {
            Request::Hello { .. } => "Hello",
            Request::Ping => "Ping",
            Request::Create { .. } => "Create",
            Request::Join { .. } => "Join",
            Request::Close { .. } => "Close",
            Request::View { .. } => "View",
            Request::List { .. } => "List",
            Request::Shutdown { .. } => "Shutdown",
        }
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Response {
    /// Handshake response
    Welcome {
        server_id: Uuid,
        protocol_version: u32,
    },

    /// Liveness reply, server clock in unix millis
    Pong { timestamp: i64 },

    /// Session created
    Created { code: String },

    /// Caller joined a session
    Joined { code: String, nickname: String },

    /// Session closed
    Closed { code: String },

    /// Session status and participants
    Roster(SessionSnapshot),

    /// Randomized nickname ordering
    Order { code: String, nicknames: Vec<String> },

    /// Request refused for a user-facing reason (validation, permission)
    Rejected { message: String },

    /// Request could not be completed for an internal reason
    Failed { message: String },

    /// Acknowledgment (for commands that need confirmation)
    Ack { for_command: String },

    /// Protocol-level error
    Error { message: String },
}
