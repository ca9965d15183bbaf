//! API handlers.

pub mod file;

pub use file::*;

use std::time::Duration;

use crate::config::StorageConfig;
use crate::file::FileService;

/// Shared state for all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Drive operations.
    pub files: FileService,
    /// Maximum accepted upload body, in bytes.
    pub max_upload_bytes: usize,
    /// Time allowed to receive an upload body.
    pub upload_timeout: Duration,
    /// Listing size when the client gives no limit.
    pub default_list_limit: Option<usize>,
}

impl AppState {
    /// Create state with default upload limits.
    pub fn new(files: FileService) -> Self {
        Self::with_limits(files, &StorageConfig::default())
    }

    /// Create state with the limits from a storage configuration.
    pub fn with_limits(files: FileService, config: &StorageConfig) -> Self {
        Self {
            files,
            max_upload_bytes: config.max_upload_bytes(),
            upload_timeout: Duration::from_secs(config.upload_timeout_secs),
            default_list_limit: config.default_list_limit,
        }
    }
}
