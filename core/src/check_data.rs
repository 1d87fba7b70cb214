//! Append-only check-data log.
//!
//! Every user action on a check (selection, comment, bookmark, invalidation)
//! is written as a new timestamped file; the newest file for a context is the
//! current value.
//!
//! ```text
//! <project>/.apps/translationCore/checkData/<category>/<bookId>/<chapter>/<verse>/
//!   2026-10-19T08_15_02.114Z.json
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{CheckError, Result};
use crate::io::write_json_atomic;
use crate::types::{ContextId, Selection};

/// Kind of check data, one directory per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckCategory {
    Selections,
    Comments,
    /// Bookmarks.
    Reminders,
    Invalidated,
}

impl CheckCategory {
    pub const ALL: [CheckCategory; 4] = [
        CheckCategory::Selections,
        CheckCategory::Comments,
        CheckCategory::Reminders,
        CheckCategory::Invalidated,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            CheckCategory::Selections => "selections",
            CheckCategory::Comments => "comments",
            CheckCategory::Reminders => "reminders",
            CheckCategory::Invalidated => "invalidated",
        }
    }
}

impl fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Timestamp in the `Date.toJSON()` shape: RFC 3339, milliseconds, `Z`.
pub fn generate_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// File name for an entry written at `timestamp`. `:` is not portable in
/// file names.
pub fn timestamp_file_name(timestamp: &str) -> String {
    format!("{}.json", timestamp.replace(':', "_"))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionsEntry {
    pub context_id: ContextId,
    #[serde(default)]
    pub selections: Vec<Selection>,
    #[serde(default)]
    pub nothing_to_select: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub modified_timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentEntry {
    pub context_id: ContextId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub modified_timestamp: Option<String>,
}

/// Bookmark or invalidation flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleEntry {
    pub context_id: ContextId,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub modified_timestamp: Option<String>,
    #[serde(default)]
    pub gateway_language_code: Option<String>,
    #[serde(default)]
    pub gateway_language_quote: Option<String>,
}

/// Entries carry the context they were recorded for.
pub trait CheckEntry: Serialize + DeserializeOwned {
    fn context_id(&self) -> &ContextId;
    fn modified_timestamp(&self) -> Option<&str>;
    fn set_modified_timestamp(&mut self, timestamp: String);
}

macro_rules! impl_check_entry {
    ($($ty:ty),+) => {
        $(impl CheckEntry for $ty {
            fn context_id(&self) -> &ContextId {
                &self.context_id
            }

            fn modified_timestamp(&self) -> Option<&str> {
                self.modified_timestamp.as_deref()
            }

            fn set_modified_timestamp(&mut self, timestamp: String) {
                self.modified_timestamp = Some(timestamp);
            }
        })+
    };
}

impl_check_entry!(SelectionsEntry, CommentEntry, ToggleEntry);

/// Newest entry in `dir` recorded for `context_id`.
///
/// Files are sorted by name (timestamps sort chronologically) and scanned
/// newest first. Only `.json` files count; files that fail to parse are
/// logged and skipped.
pub fn load_check_data<T: DeserializeOwned>(dir: &Path, context_id: &ContextId) -> Option<T> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Could not list {}: {err}", dir.display());
            }
            return None;
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    for path in files.iter().rev() {
        let value = match crate::io::read_json::<serde_json::Value>(path) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("File exists but could not be loaded: {err}");
                continue;
            }
        };
        let Some(recorded) = value
            .get("contextId")
            .and_then(|c| serde_json::from_value::<ContextId>(c.clone()).ok())
        else {
            continue;
        };
        if !recorded.same_check(context_id) {
            continue;
        }
        match serde_json::from_value::<T>(value) {
            Ok(entry) => return Some(entry),
            Err(err) => {
                tracing::warn!("Skipping malformed check data {}: {err}", path.display());
            }
        }
    }
    None
}

/// One category's log for a project.
#[derive(Debug, Clone)]
pub struct CheckDataLog {
    root: PathBuf,
    category: CheckCategory,
}

impl CheckDataLog {
    pub fn new(project: &Path, category: CheckCategory) -> Self {
        Self {
            root: check_data_root(project).join(category.dir_name()),
            category,
        }
    }

    pub fn category(&self) -> CheckCategory {
        self.category
    }

    /// Directory holding the entries for the context's verse.
    pub fn verse_dir(&self, context_id: &ContextId) -> Result<PathBuf> {
        let reference = context_id
            .reference
            .as_ref()
            .ok_or_else(|| CheckError::MissingReference(context_id.reference_str()))?;
        Ok(self
            .root
            .join(&reference.book_id)
            .join(reference.chapter.to_string())
            .join(reference.verse.to_string()))
    }

    /// The "current" entry for a context: the newest one on disk.
    pub fn latest_for<T: DeserializeOwned>(&self, context_id: &ContextId) -> Option<T> {
        let dir = self.verse_dir(context_id).ok()?;
        load_check_data(&dir, context_id)
    }

    /// Stamp `entry` with the current time and write it as a new file.
    ///
    /// Returns the path written.
    pub fn append<T: CheckEntry>(&self, entry: &mut T) -> Result<PathBuf> {
        let timestamp = generate_timestamp();
        let path = self
            .verse_dir(entry.context_id())?
            .join(timestamp_file_name(&timestamp));
        entry.set_modified_timestamp(timestamp);
        write_json_atomic(&path, &*entry)?;
        tracing::debug!(
            "Recorded {} for {}",
            self.category,
            entry.context_id().reference_str()
        );
        Ok(path)
    }
}

/// Root of all check-data categories in a project.
pub fn check_data_root(project: &Path) -> PathBuf {
    crate::apps_dir(project).join("checkData")
}

/// All four categories read back from disk for one context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedCheckData {
    pub selections: Option<SelectionsEntry>,
    pub comments: Option<CommentEntry>,
    pub reminders: Option<ToggleEntry>,
    pub invalidated: Option<ToggleEntry>,
}

impl LoadedCheckData {
    pub fn load(project: &Path, context_id: &ContextId) -> Self {
        Self {
            selections: CheckDataLog::new(project, CheckCategory::Selections)
                .latest_for(context_id),
            comments: CheckDataLog::new(project, CheckCategory::Comments).latest_for(context_id),
            reminders: CheckDataLog::new(project, CheckCategory::Reminders).latest_for(context_id),
            invalidated: CheckDataLog::new(project, CheckCategory::Invalidated)
                .latest_for(context_id),
        }
    }
}
