//! Stored record types: knowledge entries and conversation turns.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValidationError;
use crate::normalize::{normalize, token_set};

/// Category assigned when none is given.
pub const DEFAULT_CATEGORY: &str = "general";

/// Language label assigned when none is given.
pub const DEFAULT_LANGUAGE: &str = "hindi";

/// One stored question/answer pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeEntry {
    /// Identifier assigned at creation.
    pub id: Uuid,
    /// Question as originally submitted.
    pub question: String,
    /// Dedupe and match key derived from `question`.
    pub normalized_question: String,
    /// Reply returned verbatim on a match.
    pub answer: String,
    /// Free-form label.
    pub category: String,
    /// Advisory language label.
    pub language: String,
    /// When the entry was first created.
    pub created_at: DateTime<Utc>,
    /// When the answer or labels were last written.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing an entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewEntry {
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl NewEntry {
    /// Create an entry input with default category and language.
    #[must_use]
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            category: None,
            language: None,
        }
    }

    /// Set the category label.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the language label.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Check that question and answer survive normalization.
    ///
    /// Returns the normalized question on success.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if either field normalizes to empty.
    pub fn validate(&self) -> Result<String, ValidationError> {
        let normalized = normalize(&self.question);
        if normalized.is_empty() {
            return Err(ValidationError::EmptyQuestion);
        }
        if normalize(&self.answer).is_empty() {
            return Err(ValidationError::EmptyAnswer);
        }
        Ok(normalized)
    }

    /// Effective category, falling back to the default for missing or blank labels.
    #[must_use]
    pub fn category_or_default(&self) -> &str {
        non_blank(self.category.as_deref()).unwrap_or(DEFAULT_CATEGORY)
    }

    /// Effective language, falling back to the default for missing or blank labels.
    #[must_use]
    pub fn language_or_default(&self) -> &str {
        non_blank(self.language.as_deref()).unwrap_or(DEFAULT_LANGUAGE)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// An entry together with its pre-computed question tokens.
#[derive(Debug, Clone)]
pub struct IndexedEntry {
    pub entry: KnowledgeEntry,
    pub tokens: HashSet<String>,
}

impl IndexedEntry {
    #[must_use]
    pub fn new(entry: KnowledgeEntry) -> Self {
        let tokens = token_set(&entry.normalized_question);
        Self { entry, tokens }
    }
}

/// One logged exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationTurn {
    pub id: Uuid,
    /// Who sent the message; `None` for stateless callers.
    pub actor_id: Option<String>,
    pub input_text: String,
    pub output_text: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// Create a turn stamped with the current time.
    #[must_use]
    pub fn new(
        actor_id: Option<String>,
        input_text: impl Into<String>,
        output_text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_id,
            input_text: input_text.into(),
            output_text: output_text.into(),
            timestamp: Utc::now(),
        }
    }
}
