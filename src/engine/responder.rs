//! The knowledge engine: answers messages, learns and forgets entries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::fallback::FallbackPicker;
use crate::config::ResponderConfig;
use crate::matcher::{Matcher, MAX_SEARCH_RESULTS};
use crate::store::{
    ConversationLog, ConversationTurn, EntryStore, KnowledgeEntry, NewEntry, StoreError,
    ValidationError,
};

/// Knowledge and conversation totals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Statistics {
    pub knowledge_count: usize,
    pub conversation_count: u64,
    /// Latest entry write; serialized as `"never"` for an empty store.
    #[serde(with = "last_updated")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Statistics {
    /// Human-readable last update time.
    #[must_use]
    pub fn last_updated_display(&self) -> String {
        self.last_updated.map_or_else(
            || last_updated::NEVER.to_string(),
            |at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        )
    }
}

mod last_updated {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const NEVER: &str = "never";

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(at) => serializer.serialize_str(&at.to_rfc3339()),
            None => serializer.serialize_str(NEVER),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == NEVER {
            return Ok(None);
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| Some(at.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom)
    }
}

/// Result of teaching the engine a new pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LearnOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<KnowledgeEntry>,
    /// Why the pair was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LearnOutcome {
    fn learned(entry: KnowledgeEntry) -> Self {
        Self {
            success: true,
            entry: Some(entry),
            error: None,
        }
    }

    fn rejected(reason: ValidationError) -> Self {
        Self {
            success: false,
            entry: None,
            error: Some(reason.to_string()),
        }
    }
}

/// Orchestrates matching, learning and conversation logging.
///
/// Holds no state of its own beyond the fallback cursor; clones share the
/// same stores.
#[derive(Debug, Clone)]
pub struct KnowledgeEngine {
    entries: EntryStore,
    conversations: ConversationLog,
    matcher: Matcher,
    fallback: Arc<FallbackPicker>,
    search_limit: usize,
}

impl KnowledgeEngine {
    /// Create an engine over existing stores with default matching and fallbacks.
    #[must_use]
    pub fn new(entries: EntryStore, conversations: ConversationLog) -> Self {
        Self {
            entries,
            conversations,
            matcher: Matcher::default(),
            fallback: Arc::new(FallbackPicker::default()),
            search_limit: MAX_SEARCH_RESULTS,
        }
    }

    /// Open both stores at the configured database path and apply the
    /// matcher and fallback settings.
    ///
    /// # Errors
    ///
    /// Returns an error if either store cannot be opened.
    pub async fn open(config: &ResponderConfig) -> Result<Self, StoreError> {
        let entries = EntryStore::open(&config.storage.path).await?;
        let conversations = ConversationLog::open(&config.storage.path).await?;
        tracing::info!(
            path = %config.storage.path.display(),
            entries = entries.len().await,
            "Opened knowledge engine"
        );
        Ok(Self::new(entries, conversations).with_config(config))
    }

    /// Open an engine over fresh in-memory stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory databases cannot be created.
    pub async fn open_in_memory(config: &ResponderConfig) -> Result<Self, StoreError> {
        let entries = EntryStore::open_in_memory().await?;
        let conversations = ConversationLog::open_in_memory().await?;
        Ok(Self::new(entries, conversations).with_config(config))
    }

    /// Apply matcher and fallback settings (builder pattern).
    #[must_use]
    pub fn with_config(self, config: &ResponderConfig) -> Self {
        let fallback = FallbackPicker::new(
            config.fallback.replies.clone(),
            config.fallback.policy,
            config.fallback.seed,
        );
        self.with_matcher(Matcher::new(config.matcher.threshold))
            .with_fallback(fallback)
            .with_search_limit(config.matcher.search_limit)
    }

    /// Set the matcher (builder pattern).
    #[must_use]
    pub fn with_matcher(mut self, matcher: Matcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Set the fallback picker (builder pattern).
    #[must_use]
    pub fn with_fallback(mut self, fallback: FallbackPicker) -> Self {
        self.fallback = Arc::new(fallback);
        self
    }

    /// Set the search result limit, capped at [`MAX_SEARCH_RESULTS`] (builder pattern).
    #[must_use]
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit.clamp(1, MAX_SEARCH_RESULTS);
        self
    }

    /// The entry store backing this engine.
    #[must_use]
    pub fn entries(&self) -> &EntryStore {
        &self.entries
    }

    /// The conversation log backing this engine.
    #[must_use]
    pub fn conversations(&self) -> &ConversationLog {
        &self.conversations
    }

    /// Answer a message and log the exchange.
    ///
    /// A message with no matching entry gets a fallback reply. Every call
    /// appends exactly one conversation turn.
    ///
    /// # Errors
    ///
    /// Returns an error only if the conversation log write fails.
    pub async fn respond(
        &self,
        message: &str,
        actor_id: Option<&str>,
    ) -> Result<String, EngineError> {
        self.sync_entries().await;
        let matcher = self.matcher;
        let hit = self
            .entries
            .with_entries(|entries| matcher.find_best(message, entries))
            .await;

        let (reply, matched) = match hit {
            Some(candidate) => (candidate.entry.answer, true),
            None => (self.fallback.pick(), false),
        };

        let turn = ConversationTurn::new(actor_id.map(str::to_string), message, reply.clone());
        self.conversations.append(&turn).await?;

        tracing::debug!(actor_id = ?actor_id, matched, "Responded");
        Ok(reply)
    }

    /// Teach a question/answer pair.
    ///
    /// Empty input is reported as `success: false` rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub async fn learn_new_response(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<LearnOutcome, EngineError> {
        match self.add(NewEntry::new(question.trim(), answer.trim())).await {
            Ok(entry) => {
                tracing::info!(question = %entry.question, "Learned new response");
                Ok(LearnOutcome::learned(entry))
            }
            Err(EngineError::Validation(reason)) => {
                tracing::info!(%reason, "Rejected learn request");
                Ok(LearnOutcome::rejected(reason))
            }
            Err(e) => Err(e),
        }
    }

    /// Create or replace an entry.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` for empty input, or a store error.
    pub async fn add(&self, new_entry: NewEntry) -> Result<KnowledgeEntry, EngineError> {
        Ok(self.entries.add(new_entry).await?)
    }

    /// Forget the entry stored under `question`. Returns `false` if none existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub async fn forget(&self, question: &str) -> Result<bool, EngineError> {
        let deleted = self.entries.delete(question).await?;
        if deleted {
            tracing::info!(question = %question, "Forgot knowledge entry");
        }
        Ok(deleted)
    }

    /// All entries in insertion order.
    pub async fn list_all(&self) -> Vec<KnowledgeEntry> {
        self.sync_entries().await;
        self.entries.list_all().await
    }

    /// Entries ranked against free text, at most the configured limit.
    pub async fn search(&self, query: &str) -> Vec<KnowledgeEntry> {
        self.sync_entries().await;
        let matcher = self.matcher;
        let limit = self.search_limit;
        self.entries
            .with_entries(|entries| matcher.search(query, entries, limit))
            .await
    }

    /// Entry and conversation totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the conversation count cannot be read.
    pub async fn statistics(&self) -> Result<Statistics, EngineError> {
        self.sync_entries().await;
        let entries = self.entries.statistics().await;
        let conversation_count = self.conversations.count().await?;
        Ok(Statistics {
            knowledge_count: entries.count,
            conversation_count,
            last_updated: entries.last_updated,
        })
    }

    /// Pick up entries written by other processes sharing the database.
    /// A failed check keeps serving the current index.
    async fn sync_entries(&self) {
        if let Err(e) = self.entries.refresh().await {
            tracing::warn!(error = %e, "Failed to check for external knowledge changes");
        }
    }

    /// Most recent turns, newest first, optionally for one actor.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read.
    pub async fn recent_turns(
        &self,
        actor_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, EngineError> {
        Ok(self.conversations.recent(actor_id, limit).await?)
    }
}
