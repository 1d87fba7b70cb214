//! The checking session: current context, its check state, and the side
//! effects of moving between contexts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::auto_commit::CommitScheduler;
use crate::check_data::{
    CheckCategory, CheckDataLog, CheckEntry, CommentEntry, LoadedCheckData, SelectionsEntry,
    ToggleEntry,
};
use crate::context_id::{load_context_id, save_context_id};
use crate::error::{CheckError, Result};
use crate::filters::Filters;
use crate::gateway::GatewayQuote;
use crate::group_data::GroupsStore;
use crate::navigation::{Direction, navigate};
use crate::types::{CheckRecord, ContextId, Selection};

/// User-recorded state of the current check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckState {
    pub selections: Vec<Selection>,
    pub nothing_to_select: bool,
    pub reminders: bool,
    pub invalidated: bool,
    pub comments: String,
    pub modified_timestamp: Option<String>,
}

impl From<&CheckRecord> for CheckState {
    fn from(record: &CheckRecord) -> Self {
        Self {
            selections: record.selections.clone().unwrap_or_default(),
            nothing_to_select: record.nothing_to_select.unwrap_or(false),
            reminders: record.reminders.unwrap_or(false),
            invalidated: record.invalidated.unwrap_or(false),
            comments: record.comments.clone().unwrap_or_default(),
            modified_timestamp: record.modified_timestamp.clone(),
        }
    }
}

impl From<LoadedCheckData> for CheckState {
    fn from(loaded: LoadedCheckData) -> Self {
        let mut state = CheckState::default();
        if let Some(entry) = loaded.selections {
            state.selections = entry.selections;
            state.nothing_to_select = entry.nothing_to_select;
            state.modified_timestamp = entry.modified_timestamp;
        }
        if let Some(entry) = loaded.comments {
            state.comments = entry.text;
        }
        state.reminders = loaded.reminders.is_some_and(|e| e.enabled);
        state.invalidated = loaded.invalidated.is_some_and(|e| e.enabled);
        state
    }
}

/// Where a context's check state came from on the last change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSource {
    GroupData,
    CheckDataLog,
    Empty,
}

/// Owns the current context for one tool and book of a project.
pub struct CheckingSession {
    project: PathBuf,
    tool: String,
    book_id: String,
    store: GroupsStore,
    filters: Filters,
    username: Option<String>,
    committer: Arc<dyn CommitScheduler>,
    context_id: Option<ContextId>,
    state: CheckState,
    state_source: StateSource,
}

impl CheckingSession {
    pub fn new(
        project: impl Into<PathBuf>,
        tool: impl Into<String>,
        book_id: impl Into<String>,
        store: GroupsStore,
        committer: Arc<dyn CommitScheduler>,
    ) -> Self {
        Self {
            project: project.into(),
            tool: tool.into(),
            book_id: book_id.into(),
            store,
            filters: Filters::default(),
            username: None,
            committer,
            context_id: None,
            state: CheckState::default(),
            state_source: StateSource::Empty,
        }
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    pub fn project(&self) -> &Path {
        &self.project
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    pub fn store(&self) -> &GroupsStore {
        &self.store
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut Filters {
        &mut self.filters
    }

    pub fn context_id(&self) -> Option<&ContextId> {
        self.context_id.as_ref()
    }

    pub fn state(&self) -> &CheckState {
        &self.state
    }

    pub fn state_source(&self) -> StateSource {
        self.state_source
    }

    /// Make `context_id` current.
    ///
    /// Check state is seeded from the loaded group data when the check is
    /// there, otherwise read back from the check-data log. The context is
    /// then persisted and a delayed commit is scheduled.
    pub fn change_current_context_id(&mut self, context_id: Option<ContextId>) -> Result<()> {
        let Some(context_id) = context_id else {
            tracing::info!("No current context for {} {}", self.tool, self.book_id);
            self.context_id = None;
            self.state = CheckState::default();
            self.state_source = StateSource::Empty;
            return Ok(());
        };

        let (state, state_source) = match self.store.find(&context_id) {
            Some(record) => (CheckState::from(record), StateSource::GroupData),
            None => {
                tracing::debug!(
                    "{} not in group data, loading check data",
                    context_id.reference_str()
                );
                (
                    CheckState::from(LoadedCheckData::load(&self.project, &context_id)),
                    StateSource::CheckDataLog,
                )
            }
        };

        save_context_id(&self.project, &context_id)?;
        tracing::info!("Current context is now {}", context_id.reference_str());
        self.committer.schedule(&context_id);
        self.context_id = Some(context_id);
        self.state = state;
        self.state_source = state_source;
        Ok(())
    }

    /// Restore the persisted context, falling back to the first check of the
    /// project when it is missing, unreadable, has no reference, or names an
    /// unknown group.
    pub fn load_current_context_id(&mut self) -> Result<Option<ContextId>> {
        let saved = match load_context_id(&self.project, &self.tool, &self.book_id) {
            Ok(saved) => saved,
            Err(err) => {
                tracing::warn!("Could not read saved context: {err}");
                None
            }
        };

        let context_id = match saved {
            Some(saved) if saved.reference.is_none() => {
                tracing::warn!(
                    "Saved context {} has no reference, using first context",
                    saved.reference_str()
                );
                self.store.first_context_id()
            }
            Some(saved) if self.store.contains_group(&saved.group_id) => Some(saved),
            Some(saved) => {
                tracing::warn!(
                    "Saved context group {} is not in the index, using first context",
                    saved.group_id
                );
                self.store.first_context_id()
            }
            None => self.store.first_context_id(),
        };

        self.change_current_context_id(context_id.clone())?;
        Ok(context_id)
    }

    /// Move to the next visible check. Returns the new context, or `None`
    /// when already at the end (the current context is kept).
    pub fn change_to_next_context_id(&mut self) -> Result<Option<ContextId>> {
        self.step(Direction::Next)
    }

    pub fn change_to_previous_context_id(&mut self) -> Result<Option<ContextId>> {
        self.step(Direction::Previous)
    }

    fn step(&mut self, direction: Direction) -> Result<Option<ContextId>> {
        let target = match &self.context_id {
            Some(current) => navigate(
                direction,
                current,
                self.store.data(),
                self.store.index(),
                &self.filters,
            ),
            None => crate::navigation::first_visible_context(
                self.store.data(),
                self.store.index(),
                &self.filters,
            ),
        };
        let Some(target) = target else {
            return Ok(None);
        };
        self.change_current_context_id(Some(target.clone()))?;
        Ok(Some(target))
    }

    /// Checks of every group on the current verse.
    pub fn verse_group_data(&self) -> HashMap<String, Vec<CheckRecord>> {
        match &self.context_id {
            Some(context_id) => self.store.group_data_for_verse(context_id),
            None => HashMap::new(),
        }
    }

    pub fn change_selections(
        &mut self,
        selections: Vec<Selection>,
        nothing_to_select: bool,
    ) -> Result<()> {
        let context_id = self.require_context()?;
        let mut entry = SelectionsEntry {
            context_id: context_id.clone(),
            selections,
            nothing_to_select,
            username: self.username.clone(),
            modified_timestamp: None,
        };
        let timestamp = self.record(CheckCategory::Selections, &mut entry)?;

        self.state.selections = entry.selections.clone();
        self.state.nothing_to_select = nothing_to_select;
        self.state.modified_timestamp = timestamp.clone();
        self.update_record(&context_id, |record| {
            record.selections = Some(entry.selections);
            record.nothing_to_select = Some(nothing_to_select);
            record.modified_timestamp = timestamp;
        });
        self.committer.schedule(&context_id);
        Ok(())
    }

    pub fn add_comment(&mut self, text: impl Into<String>) -> Result<()> {
        let context_id = self.require_context()?;
        let mut entry = CommentEntry {
            context_id: context_id.clone(),
            text: text.into(),
            username: self.username.clone(),
            modified_timestamp: None,
        };
        self.record(CheckCategory::Comments, &mut entry)?;

        self.state.comments = entry.text.clone();
        self.update_record(&context_id, |record| {
            record.comments = Some(entry.text);
        });
        self.committer.schedule(&context_id);
        Ok(())
    }

    pub fn set_bookmark(&mut self, enabled: bool, gateway: GatewayQuote) -> Result<()> {
        let context_id = self.record_toggle(CheckCategory::Reminders, enabled, gateway)?;
        self.state.reminders = enabled;
        self.update_record(&context_id, |record| record.reminders = Some(enabled));
        self.committer.schedule(&context_id);
        Ok(())
    }

    pub fn set_invalidated(&mut self, enabled: bool, gateway: GatewayQuote) -> Result<()> {
        let context_id = self.record_toggle(CheckCategory::Invalidated, enabled, gateway)?;
        self.state.invalidated = enabled;
        self.update_record(&context_id, |record| record.invalidated = Some(enabled));
        self.committer.schedule(&context_id);
        Ok(())
    }

    fn record_toggle(
        &self,
        category: CheckCategory,
        enabled: bool,
        gateway: GatewayQuote,
    ) -> Result<ContextId> {
        let context_id = self.require_context()?;
        let mut entry = ToggleEntry {
            context_id: context_id.clone(),
            enabled,
            username: self.username.clone(),
            modified_timestamp: None,
            gateway_language_code: gateway.gateway_language_code,
            gateway_language_quote: gateway.gateway_language_quote,
        };
        self.record(category, &mut entry)?;
        Ok(context_id)
    }

    fn record<T: CheckEntry>(
        &self,
        category: CheckCategory,
        entry: &mut T,
    ) -> Result<Option<String>> {
        CheckDataLog::new(&self.project, category).append(entry)?;
        Ok(entry.modified_timestamp().map(str::to_string))
    }

    fn require_context(&self) -> Result<ContextId> {
        self.context_id
            .clone()
            .ok_or_else(|| CheckError::NoCurrentContext(format!("{} {}", self.tool, self.book_id)))
    }

    fn update_record<F>(&mut self, context_id: &ContextId, update: F)
    where
        F: FnOnce(&mut CheckRecord),
    {
        match self.store.find_mut(context_id) {
            Some(record) => update(record),
            None => tracing::debug!(
                "{} has no group data record to update",
                context_id.reference_str()
            ),
        }
    }
}
