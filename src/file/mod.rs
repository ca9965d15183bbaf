//! File ingestion and categorized storage.
//!
//! This module provides:
//! - Multipart body decoding
//! - Filename sanitization
//! - Extension classification
//! - Mirrored storage over a primary and a mirror root
//! - Sorted, enriched directory listings

pub mod classifier;
pub mod listing;
pub mod multipart;
pub mod sanitize;
pub mod service;
pub mod storage;

pub use classifier::{classify, classify_name, Category, FileKind};
pub use listing::{ListedFile, ListingService, WorkspaceFile};
pub use multipart::{boundary_from_content_type, BufferedDecoder, MultipartDecoder, Part};
pub use sanitize::SanitizedName;
pub use service::{Download, FileService, UploadReport, UploadRequest, UploadedFile};
pub use storage::{FileStorage, Root, StoredFile};

/// Maximum length for a stored filename (in characters).
pub const MAX_FILENAME_LENGTH: usize = 200;

/// Default cap on workspace listing entries.
pub const DEFAULT_WORKSPACE_LIST_LIMIT: usize = 50;
