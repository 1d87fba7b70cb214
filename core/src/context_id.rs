//! Persisted "current check" per tool and book.

use std::path::{Path, PathBuf};

use crate::error::{CheckError, Result};
use crate::io::{read_json, write_json_atomic};
use crate::types::ContextId;

pub const CONTEXT_ID_FILENAME: &str = "contextId.json";

/// `<project>/.apps/translationCore/index/<tool>/<bookId>/currentContextId/contextId.json`
pub fn context_id_path(project: &Path, tool: &str, book_id: &str) -> PathBuf {
    crate::group_data::group_data_dir(project, tool, book_id)
        .join("currentContextId")
        .join(CONTEXT_ID_FILENAME)
}

/// Write the context as the current one for its tool and book.
pub fn save_context_id(project: &Path, context_id: &ContextId) -> Result<PathBuf> {
    let book_id = context_id
        .reference
        .as_ref()
        .map(|r| r.book_id.as_str())
        .ok_or_else(|| CheckError::MissingReference(context_id.reference_str()))?;
    let path = context_id_path(project, &context_id.tool, book_id);
    write_json_atomic(&path, context_id)?;
    tracing::debug!("Saved current context to {}", path.display());
    Ok(path)
}

/// Read the saved context, if any.
///
/// A missing file is `Ok(None)`; an unreadable or malformed one is an error
/// the caller may choose to fall back from.
pub fn load_context_id(project: &Path, tool: &str, book_id: &str) -> Result<Option<ContextId>> {
    let path = context_id_path(project, tool, book_id);
    if !path.exists() {
        return Ok(None);
    }
    read_json(&path).map(Some)
}
