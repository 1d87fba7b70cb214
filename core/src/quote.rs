//! Quote normalization for display and comparison.

use crate::types::{ContextId, Quote};

/// Tokens that attach to the preceding word without a space.
///
/// Ellipses and dashes are deliberately absent: they read as separate words.
const ATTACHED_PUNCTUATION: &[&str] = &[".", ",", "?", "!", ";", ":"];

/// Translation key of the invalid-quote notice.
pub const QUOTE_INVALID_KEY: &str = "quote_invalid";

fn attaches_to_previous(word: &str) -> bool {
    ATTACHED_PUNCTUATION.contains(&word)
}

/// Flatten a quote into a single reading string.
///
/// Strings pass through unchanged. Token sequences are joined with single
/// spaces, except that trailing punctuation sticks to the word before it.
pub fn quote_to_string(quote: &Quote) -> String {
    let tokens = match quote {
        Quote::Text(text) => return text.clone(),
        Quote::Tokens(tokens) => tokens,
    };

    let mut out = String::new();
    for token in tokens {
        let word = token.word.trim();
        if word.is_empty() {
            continue;
        }
        if !out.is_empty() && !attaches_to_previous(word) {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Build the localized "quote is invalid" notice for a context.
///
/// `translate` receives the key and the `quote` parameter. A missing context
/// substitutes an empty quote.
pub fn invalid_quote_message<F>(context_id: Option<&ContextId>, translate: F) -> String
where
    F: Fn(&str, &[(&str, &str)]) -> String,
{
    let quote = context_id
        .map(|c| quote_to_string(&c.quote))
        .unwrap_or_default();
    translate(QUOTE_INVALID_KEY, &[("quote", quote.as_str())])
}
