//! Error types for checking operations

use std::path::PathBuf;
use thiserror::Error;

use crate::filters::FilterKey;

/// Checking result type alias
pub type Result<T> = std::result::Result<T, CheckError>;

/// Errors surfaced by the checking core.
///
/// Most read paths never produce these: malformed project files are logged
/// and skipped. Errors are reserved for writes and for inputs the caller
/// controls directly.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize JSON: {source}")]
    JsonSerialize { source: serde_json::Error },

    #[error("Failed to parse {path}: {source}")]
    JsonDeserialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Context {0} has no verse reference")]
    MissingReference(String),

    #[error("No current context for {0}")]
    NoCurrentContext(String),

    #[error("Filters {a} and {b} cannot be active together")]
    ConflictingFilters { a: FilterKey, b: FilterKey },

    #[error("Unknown filter key: {0}")]
    UnknownFilter(String),

    #[error("Invalid helps link {0:?}: expected <lang>/<resource>/<category>/<article>")]
    InvalidHelpsLink(String),
}
