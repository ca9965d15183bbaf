//! Response DTOs for Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::file::{Category, ListedFile, Root, UploadReport, UploadedFile, WorkspaceFile};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// A file in the drive listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileEntryResponse {
    /// Stored (sanitized) name.
    pub name: String,
    pub size_bytes: u64,
    /// Last modification time (RFC 3339).
    pub modified_at: String,
    /// Lowercase extension with leading dot, or empty.
    pub extension: String,
    pub category: Category,
    pub icon: String,
    pub mime: String,
    /// Root the entry was found in.
    pub source: Root,
}

impl From<ListedFile> for FileEntryResponse {
    fn from(file: ListedFile) -> Self {
        Self {
            name: file.name,
            size_bytes: file.size_bytes,
            modified_at: file.modified_at.to_rfc3339(),
            extension: file.extension,
            category: file.category,
            icon: file.icon.to_string(),
            mime: file.mime.to_string(),
            source: file.source,
        }
    }
}

/// A file in the workspace listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct WorkspaceFileResponse {
    pub name: String,
    /// Path relative to the workspace root.
    pub path: String,
    pub size_bytes: u64,
    pub modified_at: String,
    pub extension: String,
    pub category: Category,
    pub icon: String,
    pub mime: String,
}

impl From<WorkspaceFile> for WorkspaceFileResponse {
    fn from(file: WorkspaceFile) -> Self {
        Self {
            name: file.name,
            path: file.path,
            size_bytes: file.size_bytes,
            modified_at: file.modified_at.to_rfc3339(),
            extension: file.extension,
            category: file.category,
            icon: file.icon.to_string(),
            mime: file.mime.to_string(),
        }
    }
}

/// One stored file in an upload response.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadedFileResponse {
    /// Name the file was stored under.
    pub name: String,
    /// Filename as sent by the client.
    pub original_name: String,
    pub category: Category,
    pub size_bytes: u64,
    /// Roots holding a copy.
    pub stored_in: Vec<Root>,
    /// Root whose write failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_in: Option<Root>,
}

impl From<UploadedFile> for UploadedFileResponse {
    fn from(file: UploadedFile) -> Self {
        Self {
            name: file.stored_name.into_string(),
            original_name: file.original_name,
            category: file.category,
            size_bytes: file.size_bytes,
            stored_in: file.written,
            failed_in: file.failed,
        }
    }
}

/// Upload response.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// True when every file reached both roots.
    pub complete: bool,
    pub files: Vec<UploadedFileResponse>,
}

impl From<UploadReport> for UploadResponse {
    fn from(report: UploadReport) -> Self {
        Self {
            complete: !report.is_partial(),
            files: report.files.into_iter().map(Into::into).collect(),
        }
    }
}

/// Delete response.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub name: String,
    /// Roots the file was removed from.
    pub removed_from: Vec<Root>,
}
