//! Text normalization shared by storage keys, matching and search.
//!
//! Normalization is pure: lower-case, strip a fixed punctuation set, collapse
//! whitespace. Devanagari has no case, so Hindi text passes through unchanged
//! apart from danda marks.

use std::collections::HashSet;

/// Characters replaced by a space before whitespace is collapsed.
const PUNCTUATION: &[char] = &[
    '?', '!', '.', ',', ';', ':', '"', '(', ')', '[', ']', '{', '}', '<', '>', '`', '~', '*',
    '।', '॥', '…', '“', '”', '¿', '¡',
];

/// Characters removed outright, so `what's` and `whats` share a key.
const APOSTROPHES: &[char] = &['\'', '‘', '’'];

/// Normalize free text into its canonical comparison form.
#[must_use]
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !APOSTROPHES.contains(c))
        .map(|c| if PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split normalized text into ordered tokens.
#[must_use]
pub fn tokenize(normalized: &str) -> Vec<String> {
    normalized.split_whitespace().map(String::from).collect()
}

/// Token set of normalized text, used for overlap scoring.
#[must_use]
pub fn token_set(normalized: &str) -> HashSet<String> {
    tokenize(normalized).into_iter().collect()
}
