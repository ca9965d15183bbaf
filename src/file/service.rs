//! File service.
//!
//! This module provides the drive operations on top of storage:
//! - Upload: decode, sanitize, classify, mirrored write
//! - Download with primary-then-mirror lookup
//! - Delete across all roots
//! - Listings

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use super::classifier::{self, Category};
use super::listing::{ListedFile, ListingService, WorkspaceFile};
use super::multipart::{boundary_from_content_type, BufferedDecoder, MultipartDecoder};
use super::sanitize::SanitizedName;
use super::storage::{FileStorage, Root};
use crate::{DriveError, Result};

/// An upload as received from the routing layer.
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
    /// Value of the `Content-Type` header.
    pub content_type: &'a str,
    /// Fully buffered request body.
    pub body: &'a [u8],
}

impl<'a> UploadRequest<'a> {
    pub fn new(content_type: &'a str, body: &'a [u8]) -> Self {
        Self { content_type, body }
    }
}

/// Outcome for one stored file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub stored_name: SanitizedName,
    /// Filename as sent by the client.
    pub original_name: String,
    pub category: Category,
    pub size_bytes: u64,
    /// Roots that hold a copy.
    pub written: Vec<Root>,
    /// Root whose write failed, if any.
    pub failed: Option<Root>,
}

impl UploadedFile {
    pub fn is_partial(&self) -> bool {
        self.failed.is_some()
    }
}

/// Outcome of an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub files: Vec<UploadedFile>,
}

impl UploadReport {
    /// Whether any file ended up in only one root.
    pub fn is_partial(&self) -> bool {
        self.files.iter().any(UploadedFile::is_partial)
    }
}

/// An opened file ready to be streamed to a client.
#[derive(Debug)]
pub struct Download {
    pub file: fs::File,
    pub size_bytes: u64,
    pub mime: &'static str,
    pub name: SanitizedName,
    pub source: Root,
}

/// Drive operations over a [`FileStorage`].
#[derive(Clone)]
pub struct FileService {
    storage: FileStorage,
    listing: ListingService,
    decoder: Arc<dyn MultipartDecoder>,
}

impl FileService {
    /// Create a new FileService using the buffered multipart decoder.
    pub fn new(storage: FileStorage) -> Self {
        Self {
            listing: ListingService::new(storage.clone()),
            storage,
            decoder: Arc::new(BufferedDecoder),
        }
    }

    /// Enable the read-only workspace listing.
    pub fn with_workspace(mut self, path: impl Into<PathBuf>, limit: usize) -> Self {
        self.listing = self.listing.with_workspace(path, limit);
        self
    }

    /// Replace the multipart decoder.
    pub fn with_decoder(mut self, decoder: impl MultipartDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// Store every file part of a multipart body in both roots.
    ///
    /// Plain form fields are ignored, so a body without file parts yields an
    /// empty report. A file stored in only one root is reported through
    /// [`UploadedFile::failed`] rather than as an error.
    /// Any other write failure aborts the upload; files already written stay.
    pub fn upload(&self, request: &UploadRequest<'_>) -> Result<UploadReport> {
        let boundary = boundary_from_content_type(request.content_type)?;
        let parts = self.decoder.decode(request.body, boundary)?;

        if parts.is_empty() {
            return Err(DriveError::MalformedRequest(
                "no parts in multipart body".to_string(),
            ));
        }

        let mut report = UploadReport::default();

        for part in parts.iter().filter(|p| p.is_file()) {
            let original_name = part.filename.clone().unwrap_or_default();
            let stored_name = SanitizedName::sanitize_or_fallback(&original_name);
            let category = classifier::classify_name(stored_name.as_str()).category;
            let size_bytes = part.payload.len() as u64;

            let (written, failed) = match self.storage.write_mirrored(&stored_name, part.payload) {
                Ok(_) => (Root::ALL.to_vec(), None),
                Err(DriveError::PartialWrite {
                    written,
                    failed,
                    source,
                    ..
                }) => {
                    tracing::warn!(
                        name = %stored_name,
                        root = %failed,
                        error = %source,
                        "Stored file in one root only"
                    );
                    (vec![written], Some(failed))
                }
                Err(e) => {
                    tracing::error!(name = %stored_name, error = %e, "Failed to store file");
                    return Err(e);
                }
            };

            tracing::info!(
                name = %stored_name,
                category = %category,
                size = size_bytes,
                "File uploaded"
            );

            report.files.push(UploadedFile {
                stored_name,
                original_name,
                category,
                size_bytes,
                written,
                failed,
            });
        }

        if report.files.is_empty() {
            tracing::debug!(parts = parts.len(), "Upload carried no file parts");
        }

        Ok(report)
    }

    /// Open a stored file, looking in the primary root first.
    ///
    /// `name` is sanitized before lookup, so only its final path component
    /// is ever used.
    pub fn download(&self, name: &str) -> Result<Download> {
        let name = lookup_name(name)?;

        for root in Root::ALL {
            match self.storage.open_for_read(root, &name) {
                Ok((file, size_bytes)) => {
                    return Ok(Download {
                        file,
                        size_bytes,
                        mime: classifier::classify_name(name.as_str()).mime,
                        name,
                        source: root,
                    });
                }
                Err(DriveError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(DriveError::NotFound(format!("File: {name}")))
    }

    /// Delete a stored file from every root that holds it.
    ///
    /// Returns the roots it was removed from; [`DriveError::NotFound`] if
    /// none held it.
    pub fn delete(&self, name: &str) -> Result<Vec<Root>> {
        let name = lookup_name(name)?;
        let mut removed = Vec::new();

        for root in Root::ALL {
            match self.storage.delete(root, &name) {
                Ok(()) => removed.push(root),
                Err(DriveError::NotFound(_)) => {}
                Err(e) => {
                    tracing::error!(name = %name, root = %root, error = %e, "Failed to delete file");
                    return Err(e);
                }
            }
        }

        if removed.is_empty() {
            return Err(DriveError::NotFound(format!("File: {name}")));
        }

        tracing::info!(name = %name, roots = ?removed, "File deleted");
        Ok(removed)
    }

    /// Listing of both roots, newest first.
    pub fn list(&self, limit: Option<usize>) -> Vec<ListedFile> {
        self.listing.list(limit)
    }

    /// Listing of the workspace root, newest first.
    pub fn list_workspace(&self, limit: Option<usize>) -> Vec<WorkspaceFile> {
        self.listing.list_workspace(limit)
    }
}

impl std::fmt::Debug for FileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileService")
            .field("storage", &self.storage)
            .field("listing", &self.listing)
            .finish_non_exhaustive()
    }
}

fn lookup_name(raw: &str) -> Result<SanitizedName> {
    SanitizedName::sanitize(raw).ok_or_else(|| DriveError::NotFound(format!("File: {raw}")))
}
