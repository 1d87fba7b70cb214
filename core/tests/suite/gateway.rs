use std::collections::HashMap;

use pretty_assertions::assert_eq;
use tcheck_core::ContextId;
use tcheck_core::Quote;
use tcheck_core::Reference;
use tcheck_core::gateway::AlignedGlText;
use tcheck_core::gateway::Bible;
use tcheck_core::gateway::Bibles;
use tcheck_core::gateway::GatewayResolver;
use tcheck_core::gateway::VerseObject;
use tcheck_core::quote::quote_to_string;

const EN_ULT_TIT: &str = include_str!("../fixtures/en_ult_tit.json");

/// Walks milestones and returns the words aligned to a single-word quote.
fn milestone_oracle(
    verse_objects: &[VerseObject],
    quote: &Quote,
    occurrence: u32,
) -> Option<String> {
    let target = quote_to_string(quote);
    verse_objects.iter().find_map(|object| {
        let is_match = object.tag.as_deref() == Some("zaln")
            && object.content.as_deref() == Some(target.as_str())
            && object.occurrence == Some(occurrence);
        if is_match {
            let words: Vec<&str> = object
                .children
                .iter()
                .filter_map(|child| child.text.as_deref())
                .collect();
            Some(words.join(" "))
        } else {
            milestone_oracle(&object.children, quote, occurrence)
        }
    })
}

fn ult() -> Bible {
    serde_json::from_str(EN_ULT_TIT).expect("fixture bible")
}

/// The fixture re-labelled as `ulb`, with "blameless" as the aligned word.
fn ulb() -> Bible {
    let mut value: serde_json::Value = serde_json::from_str(EN_ULT_TIT).expect("fixture bible");
    value["manifest"]["dublin_core"]["identifier"] = "ulb".into();
    value["1"]["6"]["verseObjects"][1]["children"] = serde_json::json!([
        { "tag": "w", "type": "word", "text": "blameless", "occurrence": 1, "occurrences": 1 }
    ]);
    serde_json::from_value(value).expect("ulb bible")
}

fn bibles_with(editions: Vec<(&str, Bible)>) -> Bibles {
    let editions: HashMap<String, Bible> = editions
        .into_iter()
        .map(|(id, bible)| (id.to_string(), bible))
        .collect();
    Bibles::from([("en".to_string(), editions)])
}

fn bibles() -> Bibles {
    bibles_with(vec![("ult", ult())])
}

fn context(quote: &str, verse: u32) -> ContextId {
    ContextId::new(
        "translationWords",
        "blameless",
        Reference::new("tit", 1, verse),
        quote,
        1,
    )
}

fn selected() -> HashMap<String, String> {
    HashMap::from([("translationWords".to_string(), "en".to_string())])
}

#[test]
fn aligned_text_from_fixture_bible() {
    let resolver = GatewayResolver::new(&milestone_oracle);

    let result = resolver.aligned_gl_text(
        &selected(),
        &context("ἀνέγκλητος", 6),
        &bibles(),
        "translationWords",
    );

    assert_eq!(result, AlignedGlText::Aligned("without blame".to_string()));
}

#[test]
fn unaligned_quote_is_unmatched() {
    let resolver = GatewayResolver::new(&milestone_oracle);

    let result = resolver.aligned_gl_text(
        &selected(),
        &context("πιστά", 6),
        &bibles(),
        "translationWords",
    );

    assert_eq!(result, AlignedGlText::Unmatched);
}

#[test]
fn near_miss_quote_is_unmatched() {
    let resolver = GatewayResolver::new(&milestone_oracle);

    let result = resolver.aligned_gl_text(
        &selected(),
        &context("ἀνέγκλητο", 6),
        &bibles(),
        "translationWords",
    );

    assert_eq!(result, AlignedGlText::Unmatched);
}

#[test]
fn resolves_from_ulb_when_it_is_the_only_edition() {
    let resolver = GatewayResolver::new(&milestone_oracle);

    let result = resolver.aligned_gl_text(
        &selected(),
        &context("ἀνέγκλητος", 6),
        &bibles_with(vec![("ulb", ulb())]),
        "translationWords",
    );

    assert_eq!(result, AlignedGlText::Aligned("blameless".to_string()));
}

#[test]
fn ult_outranks_ulb() {
    let resolver = GatewayResolver::new(&milestone_oracle);

    let result = resolver.aligned_gl_text(
        &selected(),
        &context("ἀνέγκλητος", 6),
        &bibles_with(vec![("ulb", ulb()), ("ult", ult())]),
        "translationWords",
    );

    assert_eq!(result, AlignedGlText::Aligned("without blame".to_string()));
}

#[test]
fn missing_verse_in_every_edition_is_unmatched() {
    let resolver = GatewayResolver::new(&milestone_oracle);

    let result = resolver.aligned_gl_text(
        &selected(),
        &context("ἀνέγκλητος", 7),
        &bibles(),
        "translationWords",
    );

    assert_eq!(result, AlignedGlText::Unmatched);
}

#[test]
fn gateway_quote_for_bookmarks() {
    let resolver = GatewayResolver::new(&milestone_oracle);

    let gateway = resolver.gateway_language_code_and_quote(
        "translationWords",
        &context("ἀνέγκλητος", 6),
        Some("en"),
        &selected(),
        &bibles(),
    );

    assert_eq!(gateway.gateway_language_code.as_deref(), Some("en"));
    assert_eq!(gateway.gateway_language_quote.as_deref(), Some("without blame"));
}
