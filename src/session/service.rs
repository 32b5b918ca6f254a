//! Session service - lifecycle operations over the store

use super::{generate_code, shuffled, Session, SessionSnapshot, SessionStatus, SessionStore};
use crate::error::{FarmingError, Result};
use rand::Rng;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// How many candidate codes `create` draws before giving up
pub const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 32;

/// Implements create/join/close/view/list on top of a [`SessionStore`].
///
/// The store lives behind a mutex that is held for the whole
/// load -> mutate -> save sequence of every operation. Two concurrent joins
/// on the same session therefore both see each other's writes.
///
/// Authorization is not checked here. Callers gate `create` and `close` on
/// the privileged role before calling in.
pub struct SessionService {
    store: Mutex<SessionStore>,
    max_code_attempts: u32,
}

impl SessionService {
    /// Create a service that owns `store`
    pub fn new(store: SessionStore) -> Self {
        Self {
            store: Mutex::new(store),
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
        }
    }

    /// Override the code collision retry limit
    pub fn with_max_code_attempts(mut self, attempts: u32) -> Self {
        self.max_code_attempts = attempts;
        self
    }

    /// The store holds no in-memory state, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, SessionStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a new open session and return its code
    pub fn create(&self, creator_id: &str) -> Result<String> {
        self.create_with_rng(creator_id, &mut rand::thread_rng())
    }

    /// Like [`create`](Self::create) but drawing codes from `rng`
    pub fn create_with_rng<R: Rng + ?Sized>(
        &self,
        creator_id: &str,
        rng: &mut R,
    ) -> Result<String> {
        let store = self.lock();
        let mut sessions = store.load()?;

        let mut code = None;
        for attempt in 1..=self.max_code_attempts {
            let candidate = generate_code(rng);
            if !sessions.contains_key(&candidate) {
                code = Some(candidate);
                break;
            }
            tracing::warn!("Session code collision on attempt {}: {}", attempt, candidate);
        }
        let code = code.ok_or(FarmingError::CodeSpaceExhausted {
            attempts: self.max_code_attempts,
        })?;

        sessions.insert(code.clone(), Session::new(creator_id));
        store.save(&sessions)?;

        tracing::info!("Session {} created by {}", code, creator_id);
        Ok(code)
    }

    /// Add `user_id` to an open session under `nickname`
    pub fn join(&self, code: &str, user_id: &str, nickname: &str) -> Result<()> {
        let store = self.lock();
        let mut sessions = store.load()?;

        let session = sessions.get_mut(code).ok_or_else(|| not_found(code))?;
        if !session.status.is_open() {
            return Err(FarmingError::Closed {
                code: code.to_string(),
            });
        }
        if session.has_participant(user_id) {
            return Err(FarmingError::AlreadyJoined {
                code: code.to_string(),
                user_id: user_id.to_string(),
            });
        }

        session
            .participants
            .insert(user_id.to_string(), nickname.to_string());
        store.save(&sessions)?;

        tracing::info!("User {} joined session {} as {:?}", user_id, code, nickname);
        Ok(())
    }

    /// Close a session to new joins. Closing a closed session succeeds.
    pub fn close(&self, code: &str, requester_id: &str) -> Result<()> {
        let store = self.lock();
        let mut sessions = store.load()?;

        let session = sessions.get_mut(code).ok_or_else(|| not_found(code))?;
        session.status = SessionStatus::Closed;
        store.save(&sessions)?;

        tracing::info!("Session {} closed by {}", code, requester_id);
        Ok(())
    }

    /// Snapshot of a session's status and roster
    pub fn view(&self, code: &str) -> Result<SessionSnapshot> {
        let store = self.lock();
        let sessions = store.load()?;

        sessions
            .get(code)
            .map(|session| session.snapshot(code))
            .ok_or_else(|| not_found(code))
    }

    /// Participant nicknames in a fresh random order
    pub fn randomized_list(&self, code: &str) -> Result<Vec<String>> {
        self.randomized_list_with_rng(code, &mut rand::thread_rng())
    }

    /// Like [`randomized_list`](Self::randomized_list) but shuffling with `rng`
    pub fn randomized_list_with_rng<R: Rng + ?Sized>(
        &self,
        code: &str,
        rng: &mut R,
    ) -> Result<Vec<String>> {
        let store = self.lock();
        let sessions = store.load()?;

        let session = sessions.get(code).ok_or_else(|| not_found(code))?;
        if session.participants.is_empty() {
            return Err(FarmingError::EmptyParticipants {
                code: code.to_string(),
            });
        }

        let nicknames = session.participants.values().cloned().collect();
        Ok(shuffled(nicknames, rng))
    }

    /// Codes of every stored session, sorted
    pub fn codes(&self) -> Result<Vec<String>> {
        let store = self.lock();
        Ok(store.load()?.into_keys().collect())
    }
}

fn not_found(code: &str) -> FarmingError {
    FarmingError::NotFound {
        code: code.to_string(),
    }
}
