//! Directory listings enriched with classification.

use std::cmp::Ordering;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::classifier::{self, Category};
use super::storage::{scan_dir, FileStorage, Root, StoredFile};

/// A stored file with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedFile {
    pub name: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
    pub extension: String,
    pub category: Category,
    pub icon: &'static str,
    pub mime: &'static str,
    pub source: Root,
}

impl From<StoredFile> for ListedFile {
    fn from(file: StoredFile) -> Self {
        let kind = file.kind();
        Self {
            name: file.name,
            size_bytes: file.size_bytes,
            modified_at: file.modified_at,
            extension: file.extension,
            category: kind.category,
            icon: kind.icon,
            mime: kind.mime,
            source: file.source,
        }
    }
}

/// A file found under the read-only workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceFile {
    pub name: String,
    /// Path relative to the workspace root.
    pub path: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
    pub extension: String,
    pub category: Category,
    pub icon: &'static str,
    pub mime: &'static str,
}

/// Builds listings over the storage roots and the optional workspace root.
///
/// A name present in both roots is listed twice, once per `source`.
#[derive(Debug, Clone)]
pub struct ListingService {
    storage: FileStorage,
    workspace: Option<PathBuf>,
    workspace_limit: usize,
}

impl ListingService {
    pub fn new(storage: FileStorage) -> Self {
        Self {
            storage,
            workspace: None,
            workspace_limit: super::DEFAULT_WORKSPACE_LIST_LIMIT,
        }
    }

    /// Enable the workspace discovery listing over `path`.
    pub fn with_workspace(mut self, path: impl Into<PathBuf>, limit: usize) -> Self {
        self.workspace = Some(path.into());
        self.workspace_limit = limit;
        self
    }

    /// List both roots, newest first, optionally truncated to `limit` entries.
    ///
    /// Ties in modification time are ordered by name, then by root. A root
    /// that cannot be read is logged and contributes no entries.
    pub fn list(&self, limit: Option<usize>) -> Vec<ListedFile> {
        let mut files: Vec<ListedFile> = Root::ALL
            .iter()
            .flat_map(|&root| match self.storage.scan(root) {
                Ok(files) => files,
                Err(e) => {
                    tracing::warn!(root = %root, error = %e, "Failed to scan storage root");
                    Vec::new()
                }
            })
            .map(ListedFile::from)
            .collect();

        files.sort_by(|a, b| {
            newest_first(&a.modified_at, &a.name, &b.modified_at, &b.name)
                .then_with(|| a.source.cmp(&b.source))
        });

        if let Some(limit) = limit {
            files.truncate(limit);
        }
        files
    }

    /// Recursively list the workspace root, newest first.
    ///
    /// Returns an empty list when no workspace root is configured. The result
    /// is capped at the smaller of `limit` and the configured workspace limit.
    pub fn list_workspace(&self, limit: Option<usize>) -> Vec<WorkspaceFile> {
        let Some(root) = &self.workspace else {
            return Vec::new();
        };

        let entries = match scan_dir(root, true) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %root.display(), error = %e, "Failed to scan workspace");
                return Vec::new();
            }
        };

        let mut files: Vec<WorkspaceFile> = entries
            .into_iter()
            .map(|entry| {
                let extension = classifier::extension_of(&entry.name);
                let kind = classifier::classify(&extension);
                WorkspaceFile {
                    name: entry.name,
                    path: entry.relative_path,
                    size_bytes: entry.size_bytes,
                    modified_at: entry.modified_at,
                    extension,
                    category: kind.category,
                    icon: kind.icon,
                    mime: kind.mime,
                }
            })
            .collect();

        files.sort_by(|a, b| {
            newest_first(&a.modified_at, &a.path, &b.modified_at, &b.path)
        });

        let cap = limit.map_or(self.workspace_limit, |l| l.min(self.workspace_limit));
        files.truncate(cap);
        files
    }
}

fn newest_first(
    a_time: &DateTime<Utc>,
    a_name: &str,
    b_time: &DateTime<Utc>,
    b_name: &str,
) -> Ordering {
    b_time.cmp(a_time).then_with(|| a_name.cmp(b_name))
}
