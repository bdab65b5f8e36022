/// Configuration system for repo-client
///
/// Supports loading from multiple sources with priority:
/// CLI args > Environment variables > Config file > Defaults
///
/// The core only consumes these values; it never requires a config file.
use crate::error::{ConfigError, RepoError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Binding defaults
    #[serde(default)]
    pub client: ClientConfig,

    /// Remote clone settings
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Search defaults
    #[serde(default)]
    pub search: SearchConfig,
}

/// Defaults used when binding a repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Starting reference for history traversal
    #[serde(default = "default_reference")]
    pub reference: String,

    /// Number of commits to materialize; zero or negative means the full history
    #[serde(default = "default_commit_depth")]
    pub commit_depth: i64,
}

/// Settings for repositories that must be cloned first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Abort a clone that takes longer than this many seconds
    #[serde(default = "default_clone_timeout")]
    pub clone_timeout_secs: u64,

    /// Directory for temporary clones (system temp dir when unset)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

/// Search defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchConfig {
    /// Match case-insensitively unless a request says otherwise
    #[serde(default)]
    pub case_insensitive: bool,
}

// Default value functions
fn default_reference() -> String {
    "HEAD".to_string()
}

fn default_commit_depth() -> i64 {
    30
}

fn default_clone_timeout() -> u64 {
    300
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reference: default_reference(),
            commit_depth: default_commit_depth(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            clone_timeout_secs: default_clone_timeout(),
            temp_dir: None,
        }
    }
}

impl RemoteConfig {
    pub fn clone_timeout(&self) -> Duration {
        Duration::from_secs(self.clone_timeout_secs)
    }
}

impl Config {
    /// Default config file location, e.g. `~/.config/repo-client/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("repo-client")
            .join("config.toml")
    }

    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, RepoError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default location or create default
    pub fn load_or_default() -> Result<Self, RepoError> {
        let config_path = Self::default_path();

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::debug!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), RepoError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::SaveFailed(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Validate configuration values
    ///
    /// `client.commit_depth` accepts any value; non-positive ones mean
    /// "full history".
    pub fn validate(&self) -> Result<(), RepoError> {
        if self.client.reference.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "client.reference".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        if self.remote.clone_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "remote.clone_timeout_secs".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if let Some(dir) = &self.remote.temp_dir
            && !dir.is_dir()
        {
            return Err(ConfigError::InvalidValue {
                key: "remote.temp_dir".to_string(),
                reason: format!("'{}' is not a directory", dir.display()),
            }
            .into());
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(reference) = std::env::var("REPO_CLIENT_REFERENCE") {
            self.client.reference = reference;
        }

        if let Ok(depth) = std::env::var("REPO_CLIENT_COMMIT_DEPTH")
            && let Ok(depth) = depth.trim().parse()
        {
            self.client.commit_depth = depth;
        }

        if let Ok(timeout) = std::env::var("REPO_CLIENT_CLONE_TIMEOUT")
            && let Ok(secs) = timeout.trim().parse()
        {
            self.remote.clone_timeout_secs = secs;
        }

        if let Ok(dir) = std::env::var("REPO_CLIENT_TEMP_DIR") {
            self.remote.temp_dir = Some(PathBuf::from(dir));
        }
    }

    /// Create a new Config with defaults and environment overrides
    pub fn new() -> Result<Self, RepoError> {
        let mut config = Self::load_or_default()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}
