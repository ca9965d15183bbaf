//! Physical file storage.
//!
//! Files live flat under two roots:
//! ```text
//! {primary}/
//! ├── report.PDF
//! └── notes.md
//! {mirror}/
//! ├── report.PDF
//! └── notes.md
//! ```
//! Every upload is written to both roots, each write independent of the other.
//! Two concurrent uploads of the same name race per root (last write wins),
//! so the roots may briefly disagree about which payload is current.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::classifier::{self, FileKind};
use super::sanitize::SanitizedName;
use crate::{DriveError, Result};

/// Leading character that marks an entry as hidden.
pub const HIDDEN_MARKER: char = '.';

/// Directory names never descended into by recursive scans.
pub const SKIPPED_DIRS: &[&str] = &["node_modules"];

/// Maximum directory depth for recursive scans.
pub const MAX_SCAN_DEPTH: usize = 16;

/// One of the two storage roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Root {
    Primary,
    Mirror,
}

impl Root {
    /// All roots, in lookup order.
    pub const ALL: [Root; 2] = [Root::Primary, Root::Mirror];

    pub fn as_str(&self) -> &'static str {
        match self {
            Root::Primary => "primary",
            Root::Mirror => "mirror",
        }
    }

    /// The other root.
    pub fn other(&self) -> Root {
        match self {
            Root::Primary => Root::Mirror,
            Root::Mirror => Root::Primary,
        }
    }
}

impl std::fmt::Display for Root {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file found on one storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// File name within the root.
    pub name: String,
    /// Size in bytes, from filesystem metadata.
    pub size_bytes: u64,
    /// Modification time, from filesystem metadata.
    pub modified_at: DateTime<Utc>,
    /// Lowercase extension with leading dot, or `""`.
    pub extension: String,
    /// Root the entry was read from.
    pub source: Root,
}

impl StoredFile {
    /// Classification, recomputed from the extension on every call.
    pub fn kind(&self) -> FileKind {
        classifier::classify(&self.extension)
    }
}

/// A file found by a directory scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedEntry {
    /// File name (last path component).
    pub name: String,
    /// Path relative to the scanned directory, `/` separated.
    pub relative_path: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
}

/// Result of a successful mirrored write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    pub size_bytes: u64,
}

/// File storage over a primary and a mirror root.
#[derive(Debug, Clone)]
pub struct FileStorage {
    primary: PathBuf,
    mirror: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage over the given roots.
    ///
    /// Both root directories are created if they don't exist.
    pub fn new(primary: impl Into<PathBuf>, mirror: impl Into<PathBuf>) -> Result<Self> {
        let primary = primary.into();
        let mirror = mirror.into();
        fs::create_dir_all(&primary)?;
        fs::create_dir_all(&mirror)?;

        Ok(Self { primary, mirror })
    }

    /// Directory backing `root`.
    pub fn root_path(&self, root: Root) -> &Path {
        match root {
            Root::Primary => &self.primary,
            Root::Mirror => &self.mirror,
        }
    }

    /// Full path of `name` under `root`.
    pub fn file_path(&self, root: Root, name: &SanitizedName) -> PathBuf {
        self.root_path(root).join(name.as_str())
    }

    /// Write `content` to `root/name`, replacing any existing file.
    pub fn write(&self, root: Root, name: &SanitizedName, content: &[u8]) -> Result<()> {
        let path = self.file_path(root, name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;

        tracing::debug!(name = %name, root = %root, size = content.len(), "Stored file");
        Ok(())
    }

    /// Write `content` to both roots.
    ///
    /// Succeeds only when both writes succeed. When exactly one fails the
    /// other copy is kept and [`DriveError::PartialWrite`] is returned; when
    /// both fail the primary's error is returned as [`DriveError::Io`].
    pub fn write_mirrored(&self, name: &SanitizedName, content: &[u8]) -> Result<WriteReport> {
        let primary = self.write(Root::Primary, name, content);
        let mirror = self.write(Root::Mirror, name, content);

        match (primary, mirror) {
            (Ok(()), Ok(())) => Ok(WriteReport {
                size_bytes: content.len() as u64,
            }),
            (Ok(()), Err(e)) => Err(partial(name, Root::Mirror, e)),
            (Err(e), Ok(())) => Err(partial(name, Root::Primary, e)),
            (Err(e), Err(_)) => Err(e),
        }
    }

    /// Remove `root/name`.
    ///
    /// Returns [`DriveError::NotFound`] when the file is absent from `root`.
    pub fn delete(&self, root: Root, name: &SanitizedName) -> Result<()> {
        let path = self.file_path(root, name);

        if path.is_dir() {
            return Err(DriveError::NotFound(format!("File: {name}")));
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(name = %name, root = %root, "Deleted file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(DriveError::NotFound(format!("File: {name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Open `root/name` for reading, returning the handle and its size.
    pub fn open_for_read(&self, root: Root, name: &SanitizedName) -> Result<(fs::File, u64)> {
        let path = self.file_path(root, name);

        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(DriveError::NotFound(format!("File: {name}")));
            }
            Err(e) => return Err(e.into()),
        };

        let metadata = file.metadata()?;
        if !metadata.is_file() {
            return Err(DriveError::NotFound(format!("File: {name}")));
        }

        Ok((file, metadata.len()))
    }

    /// List the immediate, visible files of `root`.
    pub fn scan(&self, root: Root) -> Result<Vec<StoredFile>> {
        let entries = scan_dir(self.root_path(root), false)?;

        Ok(entries
            .into_iter()
            .map(|entry| StoredFile {
                extension: classifier::extension_of(&entry.name),
                name: entry.name,
                size_bytes: entry.size_bytes,
                modified_at: entry.modified_at,
                source: root,
            })
            .collect())
    }
}

fn partial(name: &SanitizedName, failed: Root, source: DriveError) -> DriveError {
    let source = match source {
        DriveError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::Other, other.to_string()),
    };
    DriveError::PartialWrite {
        name: name.to_string(),
        written: failed.other(),
        failed,
        source,
    }
}

/// Scan `dir` for visible regular files.
///
/// Hidden entries are skipped. Directories are skipped unless `recursive`,
/// in which case they are descended into (except [`SKIPPED_DIRS`] and beyond
/// [`MAX_SCAN_DEPTH`]). Symlinked directories are not followed. Entries whose
/// metadata cannot be read are skipped. A missing `dir` yields no entries.
pub fn scan_dir(dir: &Path, recursive: bool) -> Result<Vec<ScannedEntry>> {
    let mut out = Vec::new();
    if !dir.exists() {
        return Ok(out);
    }

    scan_into(dir, "", recursive, 0, &mut out)?;
    Ok(out)
}

fn scan_into(
    dir: &Path,
    prefix: &str,
    recursive: bool,
    depth: usize,
    out: &mut Vec<ScannedEntry>,
) -> Result<()> {
    for entry in fs::read_dir(dir)?.flatten() {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.starts_with(HIDDEN_MARKER) {
            continue;
        }
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        let relative_path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };

        if file_type.is_dir() {
            if recursive && depth < MAX_SCAN_DEPTH && !SKIPPED_DIRS.contains(&name.as_str()) {
                // Unreadable subdirectories are skipped, not fatal.
                if let Err(e) = scan_into(&entry.path(), &relative_path, true, depth + 1, out) {
                    tracing::debug!(path = %relative_path, error = %e, "Skipping unreadable directory");
                }
            }
            continue;
        }

        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let Ok(modified) = metadata.modified() else {
            continue;
        };

        out.push(ScannedEntry {
            name,
            relative_path,
            size_bytes: metadata.len(),
            modified_at: DateTime::<Utc>::from(modified),
        });
    }

    Ok(())
}
