//! Next/previous stepping across groups and their checks.
//!
//! The project is treated as two read-only ordered sequences: the groups
//! index, and the checks of each group. A cursor `(group_pos, record_pos)`
//! moves over them, skipping checks the active filters hide.

use serde::{Deserialize, Serialize};

use crate::filters::Filters;
use crate::group_data::find_group_data_item;
use crate::types::{CheckRecord, ContextId, GroupIndexEntry, GroupsData, GroupsIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Next,
    Previous,
}

/// Checks of one group that pass `filters`, in on-disk order. Records
/// without a reference are never navigable.
pub fn visible_group_items<'a>(
    group: &'a [CheckRecord],
    filters: &'a Filters,
) -> impl DoubleEndedIterator<Item = &'a CheckRecord> + 'a {
    group.iter().filter(move |record| is_navigable(record, filters))
}

fn is_navigable(record: &CheckRecord, filters: &Filters) -> bool {
    record.context_id.reference.is_some() && filters.is_record_visible(record)
}

/// First visible check of the project, walking groups in index order.
pub fn first_visible_context(
    groups_data: &GroupsData,
    groups_index: &GroupsIndex,
    filters: &Filters,
) -> Option<ContextId> {
    groups_index.iter().find_map(|group| {
        let records = groups_data.get(&group.id)?;
        visible_group_items(records, filters)
            .next()
            .map(|record| record.context_id.clone())
    })
}

/// Context one step away from `current`, or `None` when there is nowhere to go.
pub fn navigate(
    direction: Direction,
    current: &ContextId,
    groups_data: &GroupsData,
    groups_index: &GroupsIndex,
    filters: &Filters,
) -> Option<ContextId> {
    let Some(group_pos) = groups_index
        .iter()
        .position(|group| group.id == current.group_id)
    else {
        tracing::debug!(
            "Group {} is not in the index, falling back to first context",
            current.group_id
        );
        return first_visible_context(groups_data, groups_index, filters);
    };

    if let Some(next) = step_within_group(direction, current, groups_data, filters) {
        return Some(next);
    }

    let candidates: Box<dyn Iterator<Item = &GroupIndexEntry>> = match direction {
        Direction::Next => Box::new(groups_index.iter().skip(group_pos + 1)),
        Direction::Previous => Box::new(groups_index.iter().take(group_pos).rev()),
    };
    for group in candidates {
        let Some(records) = groups_data.get(&group.id) else {
            continue;
        };
        let mut visible = visible_group_items(records, filters);
        let found = match direction {
            Direction::Next => visible.next(),
            Direction::Previous => visible.next_back(),
        };
        if let Some(record) = found {
            return Some(record.context_id.clone());
        }
    }

    tracing::debug!("No {direction:?} context after {}", current.reference_str());
    None
}

pub fn next_context_id(
    current: &ContextId,
    groups_data: &GroupsData,
    groups_index: &GroupsIndex,
    filters: &Filters,
) -> Option<ContextId> {
    navigate(Direction::Next, current, groups_data, groups_index, filters)
}

pub fn previous_context_id(
    current: &ContextId,
    groups_data: &GroupsData,
    groups_index: &GroupsIndex,
    filters: &Filters,
) -> Option<ContextId> {
    navigate(Direction::Previous, current, groups_data, groups_index, filters)
}

/// Scan the current group from the current check's position. The current
/// check itself may be hidden by the filters; its position still anchors
/// the scan.
fn step_within_group(
    direction: Direction,
    current: &ContextId,
    groups_data: &GroupsData,
    filters: &Filters,
) -> Option<ContextId> {
    let records = groups_data.get(&current.group_id)?;
    let record_pos = find_group_data_item(current, records)?;
    let found = match direction {
        Direction::Next => records
            .get(record_pos + 1..)?
            .iter()
            .find(|record| is_navigable(record, filters)),
        Direction::Previous => records[..record_pos]
            .iter()
            .rev()
            .find(|record| is_navigable(record, filters)),
    };
    found.map(|record| record.context_id.clone())
}
