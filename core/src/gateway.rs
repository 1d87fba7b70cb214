//! Gateway-language text lookup.
//!
//! Picks the preferred aligned Bible edition for the selected gateway
//! language and asks an [`AlignmentOracle`] for the target-language words
//! aligned to a check's quote. The alignment walk itself is not done here.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::quote::quote_to_string;
use crate::types::{ContextId, Quote};

/// Default edition precedence, lowest to highest.
pub const DEFAULT_BIBLE_PRECEDENCE: &[&str] = &["udb", "ust", "ulb", "ult", "irv"];

/// Node of an aligned verse: a milestone wrapping source words, a target
/// word, or plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strong: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morph: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<VerseObject>,
}

/// A single verse of an edition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    #[serde(
        rename = "verseObjects",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub verse_objects: Option<Vec<VerseObject>>,
}

/// chapter → verse → verse data. Keys stay strings as in resource files.
pub type Chapter = HashMap<String, Verse>;

/// One Bible edition (e.g. `ult`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bible {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<serde_json::Value>,
    #[serde(flatten)]
    pub chapters: HashMap<String, Chapter>,
}

impl Bible {
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn insert_verse(&mut self, chapter: u32, verse: u32, verse_objects: Vec<VerseObject>) {
        self.chapters.entry(chapter.to_string()).or_default().insert(
            verse.to_string(),
            Verse {
                verse_objects: Some(verse_objects),
            },
        );
    }

    /// Aligned verse objects at a reference, if the edition carries them.
    pub fn verse_objects(&self, chapter: u32, verse: u32) -> Option<&[VerseObject]> {
        self.chapters
            .get(&chapter.to_string())?
            .get(&verse.to_string())?
            .verse_objects
            .as_deref()
    }
}

/// language → edition id → edition.
pub type Bibles = HashMap<String, HashMap<String, Bible>>;

/// Extracts target-language text aligned to a source quote.
pub trait AlignmentOracle {
    fn aligned_text(
        &self,
        verse_objects: &[VerseObject],
        quote: &Quote,
        occurrence: u32,
    ) -> Option<String>;
}

impl<F> AlignmentOracle for F
where
    F: Fn(&[VerseObject], &Quote, u32) -> Option<String>,
{
    fn aligned_text(
        &self,
        verse_objects: &[VerseObject],
        quote: &Quote,
        occurrence: u32,
    ) -> Option<String> {
        self(verse_objects, quote, occurrence)
    }
}

/// Edition ordering, configurable but defaulting to [`DEFAULT_BIBLE_PRECEDENCE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiblePrecedence {
    lowest_first: Vec<String>,
}

impl Default for BiblePrecedence {
    fn default() -> Self {
        Self::new(DEFAULT_BIBLE_PRECEDENCE.iter().copied())
    }
}

impl BiblePrecedence {
    pub fn new<I, S>(lowest_first: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lowest_first: lowest_first.into_iter().map(Into::into).collect(),
        }
    }

    fn rank(&self, bible_id: &str) -> Option<usize> {
        self.lowest_first.iter().position(|id| id == bible_id)
    }

    /// Listed editions first (highest precedence first), then the rest
    /// alphabetically.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let (rank_a, rank_b) = (self.rank(a), self.rank(b));
        if rank_a == rank_b {
            a.cmp(b)
        } else {
            rank_b.cmp(&rank_a)
        }
    }

    pub fn sorted<'a, I>(&self, bible_ids: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut ids: Vec<&str> = bible_ids.into_iter().collect();
        ids.sort_by(|a, b| self.compare(a, b));
        ids
    }
}

/// Comparator over edition ids using the default precedence.
pub fn bible_id_sort(a: &str, b: &str) -> Ordering {
    BiblePrecedence::default().compare(a, b)
}

/// Outcome of an aligned-text lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignedGlText {
    /// Text aligned to the quote in the preferred edition.
    Aligned(String),
    /// Lookup was impossible (no quote, no selected language, no editions);
    /// carries the original quote.
    Unresolved(Quote),
    /// Editions were available but none aligned the quote.
    Unmatched,
}

impl AlignedGlText {
    /// Display text: the aligned words, or the flattened original quote
    /// when lookup was impossible.
    pub fn into_text(self) -> Option<String> {
        match self {
            AlignedGlText::Aligned(text) => Some(text),
            AlignedGlText::Unresolved(quote) => Some(quote_to_string(&quote)),
            AlignedGlText::Unmatched => None,
        }
    }
}

/// Gateway-language code plus the aligned quote, recorded with bookmarks
/// and invalidations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayQuote {
    pub gateway_language_code: Option<String>,
    pub gateway_language_quote: Option<String>,
}

/// Resolves aligned gateway-language text through an oracle.
pub struct GatewayResolver<'a> {
    oracle: &'a dyn AlignmentOracle,
    precedence: BiblePrecedence,
}

impl<'a> GatewayResolver<'a> {
    pub fn new(oracle: &'a dyn AlignmentOracle) -> Self {
        Self {
            oracle,
            precedence: BiblePrecedence::default(),
        }
    }

    pub fn with_precedence(mut self, precedence: BiblePrecedence) -> Self {
        self.precedence = precedence;
        self
    }

    /// Aligned text for `context_id` from the gateway language selected for
    /// `tool_name`.
    pub fn aligned_gl_text(
        &self,
        tools_selected_gls: &HashMap<String, String>,
        context_id: &ContextId,
        bibles: &Bibles,
        tool_name: &str,
    ) -> AlignedGlText {
        let unresolved = || AlignedGlText::Unresolved(context_id.quote.clone());

        if context_id.quote.is_empty() {
            return unresolved();
        }
        let Some(editions) = tools_selected_gls
            .get(tool_name)
            .and_then(|language| bibles.get(language))
        else {
            return unresolved();
        };
        if editions.is_empty() {
            return unresolved();
        }

        for bible_id in self.precedence.sorted(editions.keys().map(String::as_str)) {
            let Some(bible) = editions.get(bible_id) else {
                continue;
            };
            if let Some(text) = self.aligned_text_from_bible(context_id, bible) {
                tracing::debug!(
                    "Aligned {} from {bible_id}",
                    context_id.reference_str()
                );
                return AlignedGlText::Aligned(text);
            }
        }
        AlignedGlText::Unmatched
    }

    /// Aligned text from one edition; `None` when the verse is missing or
    /// the oracle finds nothing.
    pub fn aligned_text_from_bible(&self, context_id: &ContextId, bible: &Bible) -> Option<String> {
        let reference = context_id.reference.as_ref()?;
        let verse_objects = bible.verse_objects(reference.chapter, reference.verse)?;
        self.oracle
            .aligned_text(verse_objects, &context_id.quote, context_id.occurrence)
            .filter(|text| !text.is_empty())
    }

    pub fn gateway_language_code_and_quote(
        &self,
        tool_name: &str,
        context_id: &ContextId,
        gateway_language_code: Option<&str>,
        tools_selected_gls: &HashMap<String, String>,
        bibles: &Bibles,
    ) -> GatewayQuote {
        GatewayQuote {
            gateway_language_code: gateway_language_code.map(str::to_string),
            gateway_language_quote: self
                .aligned_gl_text(tools_selected_gls, context_id, bibles, tool_name)
                .into_text(),
        }
    }
}
