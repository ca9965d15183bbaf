//! Extension classifier.
//!
//! One canonical table maps a lowercase extension (with its leading dot) to a
//! category, a display icon and a MIME type. Every extension appears exactly
//! once; unknown extensions fall back to [`Category::Other`] and
//! `application/octet-stream`.

use serde::Serialize;
use utoipa::ToSchema;

/// MIME type used for anything the table does not know.
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Icon used for anything the table does not know.
pub const DEFAULT_ICON: &str = "📎";

/// Coarse semantic grouping of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Documents,
    Spreadsheets,
    Presentations,
    Images,
    Archives,
    Code,
    Other,
}

impl Category {
    /// Lowercase name, as used in API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Documents => "documents",
            Category::Spreadsheets => "spreadsheets",
            Category::Presentations => "presentations",
            Category::Images => "images",
            Category::Archives => "archives",
            Category::Code => "code",
            Category::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification result for one extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileKind {
    pub category: Category,
    pub icon: &'static str,
    pub mime: &'static str,
}

const FALLBACK: FileKind = FileKind {
    category: Category::Other,
    icon: DEFAULT_ICON,
    mime: DEFAULT_MIME,
};

// (extension, category, icon, mime)
const TABLE: &[(&str, Category, &str, &str)] = &[
    (".pdf", Category::Documents, "📕", "application/pdf"),
    (".doc", Category::Documents, "📄", "application/msword"),
    (
        ".docx",
        Category::Documents,
        "📄",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (".txt", Category::Documents, "📝", "text/plain"),
    (".md", Category::Documents, "📝", "text/markdown"),
    (".rtf", Category::Documents, "📄", "application/rtf"),
    (
        ".odt",
        Category::Documents,
        "📄",
        "application/vnd.oasis.opendocument.text",
    ),
    (".xls", Category::Spreadsheets, "📊", "application/vnd.ms-excel"),
    (
        ".xlsx",
        Category::Spreadsheets,
        "📊",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    (".csv", Category::Spreadsheets, "📊", "text/csv"),
    (
        ".ods",
        Category::Spreadsheets,
        "📊",
        "application/vnd.oasis.opendocument.spreadsheet",
    ),
    (
        ".ppt",
        Category::Presentations,
        "📽️",
        "application/vnd.ms-powerpoint",
    ),
    (
        ".pptx",
        Category::Presentations,
        "📽️",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    (
        ".odp",
        Category::Presentations,
        "📽️",
        "application/vnd.oasis.opendocument.presentation",
    ),
    (".key", Category::Presentations, "📽️", "application/vnd.apple.keynote"),
    (".png", Category::Images, "🖼️", "image/png"),
    (".jpg", Category::Images, "🖼️", "image/jpeg"),
    (".jpeg", Category::Images, "🖼️", "image/jpeg"),
    (".gif", Category::Images, "🖼️", "image/gif"),
    (".svg", Category::Images, "🖼️", "image/svg+xml"),
    (".webp", Category::Images, "🖼️", "image/webp"),
    (".bmp", Category::Images, "🖼️", "image/bmp"),
    (".ico", Category::Images, "🖼️", "image/vnd.microsoft.icon"),
    (".zip", Category::Archives, "📦", "application/zip"),
    (".tar", Category::Archives, "📦", "application/x-tar"),
    (".gz", Category::Archives, "📦", "application/gzip"),
    (".tgz", Category::Archives, "📦", "application/gzip"),
    (".7z", Category::Archives, "📦", "application/x-7z-compressed"),
    (".rar", Category::Archives, "📦", "application/vnd.rar"),
    (".json", Category::Code, "💻", "application/json"),
    (".js", Category::Code, "💻", "application/javascript"),
    (".ts", Category::Code, "💻", "application/typescript"),
    (".html", Category::Code, "🌐", "text/html"),
    (".css", Category::Code, "🎨", "text/css"),
    (".rs", Category::Code, "💻", "text/x-rust"),
    (".py", Category::Code, "💻", "text/x-python"),
    (".sh", Category::Code, "💻", "application/x-sh"),
    (".toml", Category::Code, "💻", "application/toml"),
    (".yaml", Category::Code, "💻", "application/yaml"),
    (".yml", Category::Code, "💻", "application/yaml"),
    (".xml", Category::Code, "💻", "application/xml"),
];

/// Classify a file by extension.
///
/// The lookup is case-insensitive and accepts the extension with or without
/// its leading dot.
pub fn classify(extension: &str) -> FileKind {
    let ext = normalize_extension(extension);
    TABLE
        .iter()
        .find(|(key, ..)| *key == ext)
        .map(|&(_, category, icon, mime)| FileKind {
            category,
            icon,
            mime,
        })
        .unwrap_or(FALLBACK)
}

/// Classify a file by its name.
pub fn classify_name(name: &str) -> FileKind {
    classify(&extension_of(name))
}

/// Lowercase extension of `name` including the leading dot, or `""`.
///
/// Dot-files such as `.env` have no extension.
pub fn extension_of(name: &str) -> String {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

fn normalize_extension(extension: &str) -> String {
    let lower = extension.to_lowercase();
    if lower.is_empty() || lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_has_unique_extensions() {
        let mut seen = HashSet::new();
        for (ext, ..) in TABLE {
            assert!(seen.insert(*ext), "duplicate extension {ext}");
            assert!(ext.starts_with('.'));
            assert_eq!(*ext, ext.to_lowercase());
        }
    }

    #[test]
    fn test_classify_known() {
        assert_eq!(classify(".pdf").category, Category::Documents);
        assert_eq!(classify(".pdf").mime, "application/pdf");
        assert_eq!(classify(".csv").category, Category::Spreadsheets);
        assert_eq!(classify(".pptx").category, Category::Presentations);
        assert_eq!(classify(".png").category, Category::Images);
        assert_eq!(classify(".zip").category, Category::Archives);
        assert_eq!(classify(".json").category, Category::Code);
    }

    #[test]
    fn test_classify_case_and_dot_insensitive() {
        assert_eq!(classify(".PDF"), classify(".pdf"));
        assert_eq!(classify("pdf"), classify(".pdf"));
    }

    #[test]
    fn test_classify_unknown_falls_back() {
        let kind = classify(".xyz");
        assert_eq!(kind.category, Category::Other);
        assert_eq!(kind.mime, DEFAULT_MIME);
        assert_eq!(kind.icon, DEFAULT_ICON);
        assert_eq!(classify(""), FALLBACK);
    }

    #[test]
    fn test_classify_is_idempotent() {
        for (ext, ..) in TABLE {
            assert_eq!(classify(ext), classify(ext));
        }
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("report.PDF"), ".pdf");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of(".env"), "");
    }

    #[test]
    fn test_classify_name() {
        assert_eq!(classify_name("report.PDF").category, Category::Documents);
        assert_eq!(classify_name("Makefile").category, Category::Other);
    }

    #[test]
    fn test_category_serializes_lowercase() {
        let json = serde_json::to_string(&Category::Spreadsheets).unwrap();
        assert_eq!(json, "\"spreadsheets\"");
        assert_eq!(Category::Images.to_string(), "images");
    }
}
