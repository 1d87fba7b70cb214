//! Data model shared by every checking module.
//!
//! Field names follow the on-disk JSON (camelCase) so that project files
//! written by other checking tools load unchanged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Verse reference of a check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub book_id: String,
    pub chapter: u32,
    pub verse: u32,
}

impl Reference {
    pub fn new(book_id: impl Into<String>, chapter: u32, verse: u32) -> Self {
        Self {
            book_id: book_id.into(),
            chapter,
            verse,
        }
    }

    /// Same chapter and verse; the book is implied by the project.
    pub fn same_verse(&self, other: &Reference) -> bool {
        self.chapter == other.chapter && self.verse == other.verse
    }
}

/// One word of a multi-word quote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteToken {
    pub word: String,
    #[serde(default)]
    pub occurrence: u32,
}

impl QuoteToken {
    pub fn new(word: impl Into<String>, occurrence: u32) -> Self {
        Self {
            word: word.into(),
            occurrence,
        }
    }
}

/// Original-language text a check is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quote {
    Text(String),
    Tokens(Vec<QuoteToken>),
}

impl Default for Quote {
    fn default() -> Self {
        Quote::Text(String::new())
    }
}

impl Quote {
    pub fn is_empty(&self) -> bool {
        match self {
            Quote::Text(text) => text.is_empty(),
            Quote::Tokens(tokens) => tokens.is_empty(),
        }
    }
}

impl From<&str> for Quote {
    fn from(text: &str) -> Self {
        Quote::Text(text.to_string())
    }
}

impl From<String> for Quote {
    fn from(text: String) -> Self {
        Quote::Text(text)
    }
}

impl From<Vec<QuoteToken>> for Quote {
    fn from(tokens: Vec<QuoteToken>) -> Self {
        Quote::Tokens(tokens)
    }
}

/// Identifies exactly one checkable unit.
///
/// Every field defaults when absent so a partially written file still loads;
/// a missing `reference` marks the context as corrupt for verse lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextId {
    pub group_id: String,
    pub occurrence: u32,
    pub quote: Quote,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<Reference>,
    pub tool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strong: Option<Vec<String>>,
}

impl ContextId {
    pub fn new(
        tool: impl Into<String>,
        group_id: impl Into<String>,
        reference: Reference,
        quote: impl Into<Quote>,
        occurrence: u32,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            occurrence,
            quote: quote.into(),
            reference: Some(reference),
            tool: tool.into(),
            strong: None,
        }
    }

    /// `"<tool> <groupId> <bookId> <chapter>:<verse>"`, used in logs and
    /// commit messages.
    pub fn reference_str(&self) -> String {
        match &self.reference {
            Some(r) => format!(
                "{} {} {} {}:{}",
                self.tool, self.group_id, r.book_id, r.chapter, r.verse
            ),
            None => format!("{} {}", self.tool, self.group_id),
        }
    }

    /// Same check as `other` for disk lookups: group, occurrence and quote.
    pub fn same_check(&self, other: &ContextId) -> bool {
        self.group_id == other.group_id
            && self.occurrence == other.occurrence
            && self.quote == other.quote
    }
}

/// A user's selection inside the target-language verse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<u32>,
}

impl Selection {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            occurrence: None,
            occurrences: None,
        }
    }
}

/// One check inside a group, together with the user's recorded state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRecord {
    pub context_id: ContextId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selections: Option<Vec<Selection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nothing_to_select: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalidated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verse_edits: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_timestamp: Option<String>,
}

impl CheckRecord {
    pub fn new(context_id: ContextId) -> Self {
        Self {
            context_id,
            ..Self::default()
        }
    }
}

/// Entry of the groups index: declares a group and its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupIndexEntry {
    pub id: String,
    pub name: String,
}

impl GroupIndexEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Ordered universe of groups.
pub type GroupsIndex = Vec<GroupIndexEntry>;

/// groupId → checks of that group, in on-disk order.
pub type GroupsData = HashMap<String, Vec<CheckRecord>>;

/// Text direction of the target language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_deserializes_to_default_context() {
        let context_id: ContextId = serde_json::from_str("{}").expect("parse");
        assert_eq!(context_id, ContextId::default());
        assert!(context_id.reference.is_none());
        assert!(context_id.quote.is_empty());
    }

    #[test]
    fn quote_accepts_string_or_tokens() {
        let text: Quote = serde_json::from_str(r#""ἀνέγκλητος""#).expect("string quote");
        assert_eq!(text, Quote::from("ἀνέγκλητος"));

        let tokens: Quote =
            serde_json::from_str(r#"[{"word":"εἰς","occurrence":1},{"word":"-","occurence":1}]"#)
                .expect("token quote");
        assert_eq!(
            tokens,
            Quote::Tokens(vec![QuoteToken::new("εἰς", 1), QuoteToken::new("-", 0)])
        );
    }

    #[test]
    fn check_record_reads_tool_json() {
        let json = r#"{
            "contextId": {
                "groupId": "apostle",
                "occurrence": 1,
                "quote": "ἀπόστολος",
                "reference": {"bookId": "tit", "chapter": 1, "verse": 1},
                "tool": "translationWords",
                "strong": ["G06520"]
            },
            "selections": [{"text": "apostle", "occurrence": 1, "occurrences": 1}],
            "nothingToSelect": false,
            "verseEdits": true
        }"#;

        let record: CheckRecord = serde_json::from_str(json).expect("parse record");

        assert_eq!(record.context_id.group_id, "apostle");
        assert_eq!(record.context_id.reference, Some(Reference::new("tit", 1, 1)));
        assert_eq!(record.context_id.strong, Some(vec!["G06520".to_string()]));
        assert_eq!(record.selections.as_ref().map(Vec::len), Some(1));
        assert_eq!(record.verse_edits, Some(true));
        assert_eq!(record.invalidated, None);
    }

    #[test]
    fn reference_str_includes_tool_and_verse() {
        let context_id = ContextId::new(
            "translationWords",
            "apostle",
            Reference::new("tit", 1, 1),
            "ἀπόστολος",
            1,
        );
        assert_eq!(context_id.reference_str(), "translationWords apostle tit 1:1");
    }
}
