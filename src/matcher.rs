//! Lexical matcher: scores stored questions against free text.
//!
//! A query scores 1.0 against an entry when either normalized text is a
//! substring of the other; otherwise it scores the Jaccard overlap of their
//! token sets.
//! Ranking is a total order, so the same query over the same entries always
//! picks the same winner:
//!
//! 1. higher score
//! 2. more recent `updated_at`
//! 3. shorter normalized question
//! 4. earlier insertion

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::normalize::{normalize, token_set};
use crate::store::{IndexedEntry, KnowledgeEntry};

/// Default minimum score for a candidate to count as an answer.
pub const DEFAULT_THRESHOLD: f64 = 0.34;

/// Hard cap on free-text search results.
pub const MAX_SEARCH_RESULTS: usize = 10;

/// A scored entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchCandidate {
    pub entry: KnowledgeEntry,
    /// Similarity in `0.0..=1.0`.
    pub score: f64,
}

/// Prepared query: normalized text plus its token set.
#[derive(Debug, Clone)]
pub struct Query {
    normalized: String,
    tokens: HashSet<String>,
}

impl Query {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let normalized = normalize(text);
        let tokens = token_set(&normalized);
        Self { normalized, tokens }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Similarity of this query to one indexed entry.
    #[must_use]
    pub fn score(&self, entry: &IndexedEntry) -> f64 {
        if self.is_empty() {
            return 0.0;
        }

        let question = entry.entry.normalized_question.as_str();
        if question.contains(self.normalized.as_str()) || self.normalized.contains(question) {
            return 1.0;
        }

        jaccard(&self.tokens, &entry.tokens)
    }
}

/// Token-set Jaccard similarity; an empty union scores 0.
#[must_use]
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    #[allow(clippy::cast_precision_loss)]
    let ratio = intersection as f64 / union as f64;
    ratio
}

/// Scores entries and decides whether the best one is good enough.
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    threshold: f64,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl Matcher {
    /// Create a matcher accepting candidates scoring at least `threshold`.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Every entry with a positive score, best first.
    #[must_use]
    pub fn rank(&self, query: &str, entries: &[IndexedEntry]) -> Vec<MatchCandidate> {
        let query = Query::new(query);
        if query.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f64)> = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, query.score(entry)))
            .filter(|(_, score)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| compare(a, b, entries));

        scored
            .into_iter()
            .map(|(position, score)| MatchCandidate {
                entry: entries[position].entry.clone(),
                score,
            })
            .collect()
    }

    /// The best candidate, if it clears the threshold.
    #[must_use]
    pub fn find_best(&self, query: &str, entries: &[IndexedEntry]) -> Option<MatchCandidate> {
        let query = Query::new(query);
        if query.is_empty() {
            return None;
        }

        let best = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, query.score(entry)))
            .min_by(|a, b| compare(a, b, entries))?;

        let (position, score) = best;
        if score < self.threshold || score <= 0.0 {
            tracing::debug!(score, threshold = self.threshold, "No entry above threshold");
            return None;
        }

        let entry = entries[position].entry.clone();
        tracing::debug!(score, question = %entry.question, "Matched knowledge entry");
        Some(MatchCandidate { entry, score })
    }

    /// Free-text search: ranked entries, at most `min(limit, MAX_SEARCH_RESULTS)`.
    #[must_use]
    pub fn search(&self, query: &str, entries: &[IndexedEntry], limit: usize) -> Vec<KnowledgeEntry> {
        let mut ranked = self.rank(query, entries);
        ranked.truncate(limit.min(MAX_SEARCH_RESULTS));
        ranked.into_iter().map(|c| c.entry).collect()
    }
}

/// Ordering where `Less` means "ranks higher".
fn compare(a: &(usize, f64), b: &(usize, f64), entries: &[IndexedEntry]) -> Ordering {
    let (ea, eb) = (&entries[a.0].entry, &entries[b.0].entry);
    b.1.partial_cmp(&a.1)
        .unwrap_or(Ordering::Equal)
        .then_with(|| eb.updated_at.cmp(&ea.updated_at))
        .then_with(|| {
            ea.normalized_question
                .chars()
                .count()
                .cmp(&eb.normalized_question.chars().count())
        })
        .then_with(|| a.0.cmp(&b.0))
}
