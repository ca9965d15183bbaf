//! Filename sanitization.
//!
//! Every path that reaches the filesystem goes through [`SanitizedName`]. The
//! type has no public constructor other than the functions in this module, so
//! the storage layer cannot be handed a raw client string.

use std::fmt;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use super::MAX_FILENAME_LENGTH;

/// A filename that is safe to use as a single path component.
///
/// Invariants: non-empty, no path separators, only characters from the
/// allow-set, not `.`/`..`, does not start with a dot, at most
/// [`MAX_FILENAME_LENGTH`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SanitizedName(String);

impl SanitizedName {
    /// Sanitize an untrusted filename.
    ///
    /// Returns `None` when nothing usable is left (empty input, a bare
    /// directory path, or a name made only of dots). Callers that must store
    /// something use [`SanitizedName::sanitize_or_fallback`].
    pub fn sanitize(raw: &str) -> Option<Self> {
        let base = final_component(raw)?;

        let mut cleaned: String = base
            .chars()
            .map(|c| if is_allowed(c) { c } else { '_' })
            .take(MAX_FILENAME_LENGTH)
            .collect();

        if cleaned.chars().all(|c| c == '.') {
            return None;
        }

        // Hidden entries are skipped by directory scans, so a stored file
        // must never start with one.
        if cleaned.starts_with('.') {
            cleaned.replace_range(..1, "_");
        }

        Some(Self(cleaned))
    }

    /// Sanitize, or generate a timestamp-based name when nothing is left.
    pub fn sanitize_or_fallback(raw: &str) -> Self {
        match Self::sanitize(raw) {
            Some(name) => name,
            None => {
                let name = Self::fallback();
                tracing::debug!(original = %raw.escape_debug(), stored = %name, "Using fallback filename");
                name
            }
        }
    }

    /// Generate a fresh name of the form `upload-<timestamp>-<id>.bin`.
    pub fn fallback() -> Self {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%3f");
        let id = Uuid::new_v4().simple().to_string();
        Self(format!("upload-{stamp}-{}.bin", &id[..8]))
    }

    /// The sanitized name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SanitizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SanitizedName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Characters kept as-is; everything else becomes `_`.
fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '(' | ')' | ' ')
}

/// Last non-empty component of a `/` or `\` separated path.
fn final_component(raw: &str) -> Option<&str> {
    raw.rsplit(['/', '\\']).find(|part| !part.is_empty())
}
