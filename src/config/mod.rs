//! Configuration management

use crate::session::DEFAULT_MAX_CODE_ATTEMPTS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub sessions: SessionsConfig,
    pub auth: AuthConfig,
    pub server: ServerConfig,
}

/// Where session state is persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding every session
    pub data_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("farming")
                .join("farmings.json"),
        }
    }
}

/// Session lifecycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Candidate codes drawn before `create` gives up on collisions
    pub max_code_attempts: u32,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
        }
    }
}

/// Access control for privileged commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Platform role id required for create, close and shutdown
    pub privileged_role: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            privileged_role: "1354047540869337089".to_string(),
        }
    }
}

/// Command server settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket directory
    pub runtime_dir: Option<PathBuf>,
}

impl Config {
    /// Load config from the default location, or return defaults if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, or return defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {:?}", path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Invalid config {:?}", path))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("farming")
            .join("config.toml")
    }

    /// Get the runtime directory for sockets
    pub fn runtime_dir(&self) -> PathBuf {
        self.server
            .runtime_dir
            .clone()
            .or_else(dirs::runtime_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join("farming")
    }

    /// Get socket path for a named server
    pub fn socket_path(&self, name: &str) -> PathBuf {
        self.runtime_dir().join(format!("{}.sock", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [auth]
            privileged_role = "42"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.privileged_role, "42");
        assert_eq!(config.sessions.max_code_attempts, DEFAULT_MAX_CODE_ATTEMPTS);
        assert!(config.storage.data_file.ends_with("farmings.json"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.auth.privileged_role, "1354047540869337089");
    }

    #[test]
    fn test_socket_path_uses_runtime_dir() {
        let mut config = Config::default();
        config.server.runtime_dir = Some(PathBuf::from("/run/test"));
        assert_eq!(
            config.socket_path("main"),
            PathBuf::from("/run/test/farming/main.sock")
        );
    }
}
