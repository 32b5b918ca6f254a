//! Farming sessions - data model, durable store and lifecycle service

mod code;
mod service;
mod store;

pub use code::{generate_code, is_valid_code, shuffled, CODE_MAX, CODE_MIN};
pub use service::{SessionService, DEFAULT_MAX_CODE_ATTEMPTS};
pub use store::{SessionStore, Sessions};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Session status. Only ever moves from `Open` to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Open,
    Closed,
}

impl SessionStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, SessionStatus::Open)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Open => "open",
            SessionStatus::Closed => "closed",
        }
    }
}

/// A stored farming session. The session code is the key it is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// User who created the session
    #[serde(deserialize_with = "deserialize_user_id")]
    pub creator_id: String,

    pub status: SessionStatus,

    /// User id -> nickname, in join order
    #[serde(default)]
    pub participants: IndexMap<String, String>,
}

impl Session {
    /// A fresh open session with no participants
    pub fn new(creator_id: impl Into<String>) -> Self {
        Self {
            creator_id: creator_id.into(),
            status: SessionStatus::Open,
            participants: IndexMap::new(),
        }
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.contains_key(user_id)
    }

    /// Immutable copy of the session for presentation
    pub fn snapshot(&self, code: &str) -> SessionSnapshot {
        SessionSnapshot {
            code: code.to_string(),
            creator_id: self.creator_id.clone(),
            status: self.status,
            participants: self
                .participants
                .iter()
                .map(|(user_id, nickname)| Participant {
                    user_id: user_id.clone(),
                    nickname: nickname.clone(),
                })
                .collect(),
        }
    }
}

/// A participant as shown on the roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: String,
    pub nickname: String,
}

/// Point-in-time view of a session returned by `view`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub code: String,
    pub creator_id: String,
    pub status: SessionStatus,
    pub participants: Vec<Participant>,
}

impl SessionSnapshot {
    pub fn nicknames(&self) -> Vec<&str> {
        self.participants
            .iter()
            .map(|p| p.nickname.as_str())
            .collect()
    }
}

/// Older session files store user ids as JSON integers.
fn deserialize_user_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_accepts_numeric_creator_id() {
        let json = r#"{"creator_id": 123456789012345678, "status": "open", "participants": {}}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.creator_id, "123456789012345678");
        assert!(session.status.is_open());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&SessionStatus::Closed).unwrap();
        assert_eq!(json, "\"closed\"");
    }

    #[test]
    fn test_snapshot_keeps_join_order() {
        let mut session = Session::new("mod");
        session.participants.insert("u2".into(), "Zed".into());
        session.participants.insert("u1".into(), "Amy".into());

        let snapshot = session.snapshot("1234567890");
        assert_eq!(snapshot.nicknames(), vec!["Zed", "Amy"]);
        assert_eq!(snapshot.participants[0].user_id, "u2");
    }
}
