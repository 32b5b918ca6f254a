//! Durable session store - the JSON file is the source of truth

use super::{is_valid_code, Session};
use crate::error::{FarmingError, Result};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// All stored sessions, keyed by code
pub type Sessions = BTreeMap<String, Session>;

/// Loads and rewrites the full session mapping.
///
/// The store keeps no state besides its path. Every call to [`load`] re-reads
/// the file and every [`save`] replaces it, so concurrent callers must be
/// serialized by the owner (see `SessionService`).
///
/// [`load`]: SessionStore::load
/// [`save`]: SessionStore::save
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every session from disk.
    ///
    /// A missing file is an empty store. A file that cannot be parsed, or
    /// that holds a key which is not a session code, is reported as corrupt
    /// rather than skipped.
    pub fn load(&self) -> Result<Sessions> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No session file at {:?}, starting empty", self.path);
                return Ok(Sessions::new());
            }
            Err(source) => {
                return Err(FarmingError::StorageRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let sessions: Sessions =
            serde_json::from_str(&content).map_err(|e| FarmingError::StorageCorrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        if let Some(bad) = sessions.keys().find(|code| !is_valid_code(code)) {
            return Err(FarmingError::StorageCorrupt {
                path: self.path.clone(),
                reason: format!("invalid session code '{}'", bad),
            });
        }

        tracing::debug!("Loaded {} sessions from {:?}", sessions.len(), self.path);
        Ok(sessions)
    }

    /// Replace the file with `sessions`.
    ///
    /// Writes a sibling temp file and renames it over the target, so a failed
    /// save leaves the previous contents in place.
    pub fn save(&self, sessions: &Sessions) -> Result<()> {
        let write_err = |source: io::Error| FarmingError::StorageWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        let content = serde_json::to_string_pretty(sessions)
            .map_err(|e| write_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        let tmp_path = self.tmp_path();
        std::fs::write(&tmp_path, content).map_err(write_err)?;
        if let Err(e) = std::fs::rename(&tmp_path, &self.path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(write_err(e));
        }

        tracing::debug!("Saved {} sessions to {:?}", sessions.len(), self.path);
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
