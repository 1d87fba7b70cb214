//! Group menu model: what a display layer needs to render the groups and
//! checks, their status flags, and the filter toggles.

use serde::Serialize;

use crate::filters::{CheckFlags, FilterKey, Filters};
use crate::quote::quote_to_string;
use crate::types::{CheckRecord, ContextId, GroupsData, GroupsIndex, TextDirection};

pub const MENU_TITLE_KEY: &str = "menu.menu";
pub const MENU_NO_RESULTS_KEY: &str = "menu.no_results";

/// A filter toggle as shown in the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuFilter {
    /// Translation key of the label.
    pub label_key: &'static str,
    pub key: FilterKey,
    pub disables: &'static [FilterKey],
}

/// The menu's filter toggles, in display order.
pub fn menu_filters() -> Vec<MenuFilter> {
    [
        ("menu.invalidated", FilterKey::Invalidated),
        ("menu.bookmarks", FilterKey::Reminders),
        ("menu.selected", FilterKey::Finished),
        ("no_selection_needed", FilterKey::NothingToSelect),
        ("menu.no_selection", FilterKey::NotFinished),
        ("menu.verse_edit", FilterKey::VerseEdits),
        ("menu.comments", FilterKey::Comments),
    ]
    .into_iter()
    .map(|(label_key, key)| MenuFilter {
        label_key,
        key,
        disables: key.disables(),
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub title: String,
    pub item_id: String,
    pub finished: bool,
    pub nothing_to_select: bool,
    pub invalidated: bool,
    pub reminders: bool,
    pub verse_edits: bool,
    pub comments: bool,
    pub tooltip: String,
    pub context_id: ContextId,
}

impl MenuItem {
    pub fn flags(&self) -> CheckFlags {
        CheckFlags {
            finished: self.finished,
            invalidated: self.invalidated,
            reminders: self.reminders,
            nothing_to_select: self.nothing_to_select,
            verse_edits: self.verse_edits,
            comments: self.comments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuGroup {
    pub id: String,
    pub title: String,
    pub children: Vec<MenuItem>,
}

/// Join two title parts in reading order.
pub fn title_str(first: &str, second: &str, direction: TextDirection) -> String {
    match (first.is_empty(), second.is_empty()) {
        (_, true) => first.to_string(),
        (true, false) => second.to_string(),
        (false, false) => match direction {
            TextDirection::Ltr => format!("{first} {second}"),
            TextDirection::Rtl => format!("{second} {first}"),
        },
    }
}

/// `<occurrence>:<bookId>:<chapter>:<verse>:<quote>`
pub fn generate_item_id(context_id: &ContextId) -> String {
    let (book_id, chapter, verse) = context_id
        .reference
        .as_ref()
        .map(|r| (r.book_id.as_str(), r.chapter, r.verse))
        .unwrap_or_default();
    format!(
        "{}:{book_id}:{chapter}:{verse}:{}",
        context_id.occurrence,
        quote_to_string(&context_id.quote)
    )
}

/// Build the menu entry for one check record.
pub fn menu_item(record: &CheckRecord, book_name: &str, direction: TextDirection) -> MenuItem {
    let selection_text = record
        .selections
        .as_ref()
        .map(|selections| {
            selections
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();
    let reference = record
        .context_id
        .reference
        .as_ref()
        .map(|r| format!("{}:{}", r.chapter, r.verse))
        .unwrap_or_default();
    let passage = title_str(book_name, &reference, direction);
    let flags = CheckFlags::from(record);

    MenuItem {
        title: title_str(&passage, &selection_text, direction),
        item_id: generate_item_id(&record.context_id),
        finished: flags.finished,
        nothing_to_select: flags.nothing_to_select,
        invalidated: flags.invalidated,
        reminders: flags.reminders,
        verse_edits: flags.verse_edits,
        comments: flags.comments,
        tooltip: selection_text,
        context_id: record.context_id.clone(),
    }
}

/// One group per index entry that has data, sorted by lowercase title.
pub fn menu_entries(
    groups_index: &GroupsIndex,
    groups_data: &GroupsData,
    book_name: &str,
    direction: TextDirection,
) -> Vec<MenuGroup> {
    let mut groups: Vec<MenuGroup> = groups_index
        .iter()
        .filter_map(|group| {
            let records = groups_data.get(&group.id)?;
            Some(MenuGroup {
                id: group.id.clone(),
                title: group.name.clone(),
                children: records
                    .iter()
                    .map(|record| menu_item(record, book_name, direction))
                    .collect(),
            })
        })
        .collect();
    groups.sort_by_cached_key(|group| {
        let title = if group.title.is_empty() {
            &group.id
        } else {
            &group.title
        };
        title.to_lowercase()
    });
    groups
}

/// Menu state plus the click hand-off to whoever owns the session.
pub struct GroupMenu<F> {
    pub groups: Vec<MenuGroup>,
    pub filters: Filters,
    on_click: F,
}

impl<F> GroupMenu<F>
where
    F: FnMut(&ContextId),
{
    pub fn new(groups: Vec<MenuGroup>, filters: Filters, on_click: F) -> Self {
        Self {
            groups,
            filters,
            on_click,
        }
    }

    pub fn visible_children<'a>(
        &'a self,
        group: &'a MenuGroup,
    ) -> impl Iterator<Item = &'a MenuItem> {
        group
            .children
            .iter()
            .filter(|item| self.filters.is_visible(item.flags()))
    }

    /// Groups with at least one visible item, with only those items.
    pub fn visible_groups(&self) -> Vec<MenuGroup> {
        self.groups
            .iter()
            .filter_map(|group| {
                let children: Vec<MenuItem> = self.visible_children(group).cloned().collect();
                (!children.is_empty()).then(|| MenuGroup {
                    id: group.id.clone(),
                    title: group.title.clone(),
                    children,
                })
            })
            .collect()
    }

    /// Menu item for the current context.
    pub fn active_item(&self, context_id: &ContextId) -> Option<&MenuItem> {
        let item_id = generate_item_id(context_id);
        self.groups
            .iter()
            .find(|group| group.id == context_id.group_id)?
            .children
            .iter()
            .find(|item| item.item_id == item_id)
    }

    pub fn click(&mut self, item: &MenuItem) {
        (self.on_click)(&item.context_id);
    }
}
