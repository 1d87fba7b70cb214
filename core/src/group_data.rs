//! In-memory group data: lookup helpers plus loading from a project.
//!
//! ## Project layout
//!
//! ```text
//! <project>/.apps/translationCore/index/<tool>/<bookId>/
//!   <groupId>.json          [CheckRecord, ...] in check order
//!   currentContextId/       (see context_id.rs)
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{CheckError, Result};
use crate::types::{CheckRecord, ContextId, GroupIndexEntry, GroupsData, GroupsIndex};

/// Directory holding a tool's per-group check arrays for one book.
pub fn group_data_dir(project: &Path, tool: &str, book_id: &str) -> PathBuf {
    crate::index_dir(project).join(tool).join(book_id)
}

/// Checks of every group that fall on the context's verse.
///
/// Each group's list comes back newest-first (reverse of on-disk order).
/// Records without a reference are logged and skipped.
pub fn group_data_for_verse(
    groups_data: &GroupsData,
    groups_data_keys: &[String],
    context_id: &ContextId,
) -> HashMap<String, Vec<CheckRecord>> {
    let mut filtered: HashMap<String, Vec<CheckRecord>> = HashMap::new();
    let Some(target) = context_id.reference.as_ref() else {
        tracing::warn!("Verse filter requested without a reference for {}", context_id.group_id);
        return filtered;
    };

    for key in groups_data_keys.iter().rev() {
        let Some(group) = groups_data.get(key) else {
            continue;
        };
        for check in group.iter().rev() {
            match check.context_id.reference.as_ref() {
                Some(reference) if reference.same_verse(target) => {
                    filtered.entry(key.clone()).or_default().push(check.clone());
                }
                Some(_) => {}
                None => tracing::warn!("Corrupt check found in group \"{key}\": no reference"),
            }
        }
    }
    filtered
}

/// Whether `record` is the check `context_id` points at: same verse,
/// occurrence and quote.
pub fn matches_check(context_id: &ContextId, record: &CheckRecord) -> bool {
    let (Some(target), Some(reference)) = (
        context_id.reference.as_ref(),
        record.context_id.reference.as_ref(),
    ) else {
        return false;
    };
    reference.same_verse(target)
        && record.context_id.occurrence == context_id.occurrence
        && record.context_id.quote == context_id.quote
}

/// Index of the check for `context_id` within one group.
///
/// Scans from the end so the most recently appended duplicate wins.
pub fn find_group_data_item(context_id: &ContextId, group_data: &[CheckRecord]) -> Option<usize> {
    group_data
        .iter()
        .rposition(|record| matches_check(context_id, record))
}

/// Owner of the loaded groups index and group data for one tool and book.
#[derive(Debug, Clone, Default)]
pub struct GroupsStore {
    index: GroupsIndex,
    data: GroupsData,
}

impl GroupsStore {
    pub fn new(index: GroupsIndex, data: GroupsData) -> Self {
        Self { index, data }
    }

    pub fn index(&self) -> &GroupsIndex {
        &self.index
    }

    pub fn data(&self) -> &GroupsData {
        &self.data
    }

    pub fn set_index(&mut self, index: GroupsIndex) {
        self.index = index;
    }

    pub fn set_data(&mut self, data: GroupsData) {
        self.data = data;
    }

    /// Drop the loaded group data, keeping the index.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn contains_group(&self, group_id: &str) -> bool {
        self.index.iter().any(|group| group.id == group_id)
    }

    /// Group data keys in index order, followed by any data-only groups.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .index
            .iter()
            .filter(|group| self.data.contains_key(&group.id))
            .map(|group| group.id.clone())
            .collect();
        let mut extra: Vec<String> = self
            .data
            .keys()
            .filter(|id| !self.contains_group(id))
            .cloned()
            .collect();
        extra.sort();
        keys.extend(extra);
        keys
    }

    /// The stored record for `context_id`, if any.
    pub fn find(&self, context_id: &ContextId) -> Option<&CheckRecord> {
        let group = self.data.get(&context_id.group_id)?;
        find_group_data_item(context_id, group).map(|i| &group[i])
    }

    pub fn find_mut(&mut self, context_id: &ContextId) -> Option<&mut CheckRecord> {
        let group = self.data.get_mut(&context_id.group_id)?;
        let index = find_group_data_item(context_id, group)?;
        group.get_mut(index)
    }

    /// First check of the first group (in index order) that has any,
    /// skipping records without a reference.
    ///
    /// `None` for an empty project.
    pub fn first_context_id(&self) -> Option<ContextId> {
        self.index.iter().find_map(|group| {
            self.data
                .get(&group.id)
                .and_then(|records| {
                    records
                        .iter()
                        .find(|record| record.context_id.reference.is_some())
                })
                .map(|record| record.context_id.clone())
        })
    }

    pub fn group_data_for_verse(
        &self,
        context_id: &ContextId,
    ) -> HashMap<String, Vec<CheckRecord>> {
        group_data_for_verse(&self.data, &self.keys(), context_id)
    }
}

/// Load a groups index file (`[{"id": ..., "name": ...}, ...]`).
pub fn load_groups_index(path: &Path) -> Result<GroupsIndex> {
    let content = std::fs::read_to_string(path).map_err(|source| CheckError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str::<Vec<GroupIndexEntry>>(&content).map_err(|source| {
        CheckError::JsonDeserialize {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Load every group's checks for a tool and book.
///
/// A missing directory yields empty data. Unreadable files and malformed
/// records are logged and skipped.
pub fn load_project_group_data(project: &Path, tool: &str, book_id: &str) -> GroupsData {
    let dir = group_data_dir(project, tool, book_id);
    let mut groups_data = GroupsData::new();
    if !dir.is_dir() {
        tracing::debug!("No group data at {}", dir.display());
        return groups_data;
    }

    for entry in WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        let Some(group_id) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        match read_group_file(path) {
            Ok(records) => {
                groups_data.insert(group_id, records);
            }
            Err(err) => tracing::warn!("Skipping group data file: {err}"),
        }
    }

    tracing::info!(
        "Loaded {} groups of {tool} data for {book_id}",
        groups_data.len()
    );
    groups_data
}

/// Parse one group file record by record so a corrupt check does not hide
/// the rest of the group.
fn read_group_file(path: &Path) -> Result<Vec<CheckRecord>> {
    let content = std::fs::read_to_string(path).map_err(|source| CheckError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let values: Vec<serde_json::Value> =
        serde_json::from_str(&content).map_err(|source| CheckError::JsonDeserialize {
            path: path.to_path_buf(),
            source,
        })?;

    let mut records = Vec::with_capacity(values.len());
    for (i, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<CheckRecord>(value) {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::warn!("Corrupt check #{i} in {}: {err}", path.display());
            }
        }
    }
    Ok(records)
}
