//! teamdrive - a shared drive for small teams.
//!
//! Uploaded files are classified by extension, stored under sanitized names
//! in a primary root and mirrored to a second root, and served back over an
//! HTTP API.

pub mod config;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use error::{DriveError, Result};
pub use file::{
    Category, FileService, FileStorage, ListedFile, Root, SanitizedName, UploadReport,
    UploadRequest, WorkspaceFile,
};
pub use web::WebServer;
