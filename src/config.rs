//! Configuration module for the shared drive.

use serde::Deserialize;
use std::path::Path;

use crate::{DriveError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins (empty = any origin, no credentials).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Primary storage root.
    #[serde(default = "default_primary_path")]
    pub primary_path: String,
    /// Mirror storage root; every upload is also written here.
    #[serde(default = "default_mirror_path")]
    pub mirror_path: String,
    /// Optional read-only root for the workspace listing.
    #[serde(default)]
    pub workspace_path: Option<String>,
    /// Maximum upload body size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Time allowed to receive an upload body, in seconds.
    #[serde(default = "default_upload_timeout")]
    pub upload_timeout_secs: u64,
    /// Listing size when the client gives no limit (unset = everything).
    #[serde(default)]
    pub default_list_limit: Option<usize>,
    /// Maximum entries returned by the workspace listing.
    #[serde(default = "default_workspace_list_limit")]
    pub workspace_list_limit: usize,
}

fn default_primary_path() -> String {
    "data/uploads".to_string()
}

fn default_mirror_path() -> String {
    "data/shared-workspace".to_string()
}

fn default_max_upload_size() -> u64 {
    50
}

fn default_upload_timeout() -> u64 {
    30
}

fn default_workspace_list_limit() -> usize {
    crate::file::DEFAULT_WORKSPACE_LIST_LIMIT
}

impl StorageConfig {
    /// Maximum upload body size in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.max_upload_size_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            primary_path: default_primary_path(),
            mirror_path: default_mirror_path(),
            workspace_path: None,
            max_upload_size_mb: default_max_upload_size(),
            upload_timeout_secs: default_upload_timeout(),
            default_list_limit: None,
            workspace_list_limit: default_workspace_list_limit(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/teamdrive.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// File storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(DriveError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| DriveError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables (empty values are ignored):
    /// - `TEAMDRIVE_PRIMARY_PATH`
    /// - `TEAMDRIVE_MIRROR_PATH`
    /// - `TEAMDRIVE_WORKSPACE_PATH`
    pub fn apply_env_overrides(&mut self) {
        if let Some(path) = non_empty_env("TEAMDRIVE_PRIMARY_PATH") {
            self.storage.primary_path = path;
        }
        if let Some(path) = non_empty_env("TEAMDRIVE_MIRROR_PATH") {
            self.storage.mirror_path = path;
        }
        if let Some(path) = non_empty_env("TEAMDRIVE_WORKSPACE_PATH") {
            self.storage.workspace_path = Some(path);
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if Path::new(&self.storage.primary_path) == Path::new(&self.storage.mirror_path) {
            return Err(DriveError::Config(
                "storage.primary_path and storage.mirror_path must differ".to_string(),
            ));
        }
        if self.storage.max_upload_size_mb == 0 {
            return Err(DriveError::Config(
                "storage.max_upload_size_mb must be greater than 0".to_string(),
            ));
        }
        if self.storage.upload_timeout_secs == 0 {
            return Err(DriveError::Config(
                "storage.upload_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
