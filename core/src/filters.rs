//! Group menu filters and the per-check flags they test.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CheckError, Result};
use crate::types::CheckRecord;

/// A filter the user can toggle in the group menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FilterKey {
    #[serde(rename = "invalidated")]
    Invalidated,
    #[serde(rename = "reminders")]
    Reminders,
    #[serde(rename = "finished")]
    Finished,
    #[serde(rename = "not-finished")]
    NotFinished,
    #[serde(rename = "nothingToSelect")]
    NothingToSelect,
    #[serde(rename = "verseEdits")]
    VerseEdits,
    #[serde(rename = "comments")]
    Comments,
}

impl FilterKey {
    pub const ALL: [FilterKey; 7] = [
        FilterKey::Invalidated,
        FilterKey::Reminders,
        FilterKey::Finished,
        FilterKey::NothingToSelect,
        FilterKey::NotFinished,
        FilterKey::VerseEdits,
        FilterKey::Comments,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterKey::Invalidated => "invalidated",
            FilterKey::Reminders => "reminders",
            FilterKey::Finished => "finished",
            FilterKey::NotFinished => "not-finished",
            FilterKey::NothingToSelect => "nothingToSelect",
            FilterKey::VerseEdits => "verseEdits",
            FilterKey::Comments => "comments",
        }
    }

    /// Keys that cannot be active at the same time as this one.
    pub fn disables(self) -> &'static [FilterKey] {
        match self {
            FilterKey::Finished => &[FilterKey::NotFinished],
            FilterKey::NotFinished => &[FilterKey::Finished],
            _ => &[],
        }
    }

    fn matches(self, flags: CheckFlags) -> bool {
        match self {
            FilterKey::Invalidated => flags.invalidated,
            FilterKey::Reminders => flags.reminders,
            FilterKey::Finished => flags.finished,
            FilterKey::NotFinished => !flags.finished,
            FilterKey::NothingToSelect => flags.nothing_to_select,
            FilterKey::VerseEdits => flags.verse_edits,
            FilterKey::Comments => flags.comments,
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKey {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        FilterKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| CheckError::UnknownFilter(s.to_string()))
    }
}

/// Boolean view of a check record, as tested by filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckFlags {
    pub finished: bool,
    pub invalidated: bool,
    pub reminders: bool,
    pub nothing_to_select: bool,
    pub verse_edits: bool,
    pub comments: bool,
}

impl From<&CheckRecord> for CheckFlags {
    fn from(record: &CheckRecord) -> Self {
        let invalidated = record.invalidated.unwrap_or(false);
        let nothing_to_select = record.nothing_to_select.unwrap_or(false);
        let has_selections = record.selections.as_ref().is_some_and(|s| !s.is_empty());
        Self {
            finished: (has_selections && !invalidated) || nothing_to_select,
            invalidated,
            reminders: record.reminders.unwrap_or(false),
            nothing_to_select,
            verse_edits: record.verse_edits.unwrap_or(false),
            comments: record.comments.as_ref().is_some_and(|c| !c.is_empty()),
        }
    }
}

/// Set of active filters. Never holds two keys that disable each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    active: BTreeSet<FilterKey>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an explicit key list, rejecting mutually exclusive pairs.
    pub fn from_keys<I>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = FilterKey>,
    {
        let active: BTreeSet<FilterKey> = keys.into_iter().collect();
        for &key in &active {
            if let Some(&other) = key.disables().iter().find(|k| active.contains(*k)) {
                return Err(CheckError::ConflictingFilters { a: key, b: other });
            }
        }
        Ok(Self { active })
    }

    /// Turn `key` on, clearing every key it disables.
    pub fn activate(&mut self, key: FilterKey) {
        for disabled in key.disables() {
            self.active.remove(disabled);
        }
        self.active.insert(key);
    }

    pub fn deactivate(&mut self, key: FilterKey) {
        self.active.remove(&key);
    }

    /// Flip `key`; returns whether it is now active.
    pub fn toggle(&mut self, key: FilterKey) -> bool {
        if self.active.contains(&key) {
            self.deactivate(key);
            false
        } else {
            self.activate(key);
            true
        }
    }

    pub fn is_active(&self, key: FilterKey) -> bool {
        self.active.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = FilterKey> + '_ {
        self.active.iter().copied()
    }

    pub fn is_visible(&self, flags: CheckFlags) -> bool {
        self.active.iter().all(|key| key.matches(flags))
    }

    pub fn is_record_visible(&self, record: &CheckRecord) -> bool {
        self.is_visible(CheckFlags::from(record))
    }
}
