//! Request and response bodies for the HTTP endpoints.

use serde::{Deserialize, Serialize};

/// Body for POST /api/chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Caller identity for the conversation log.
    #[serde(default)]
    pub actor_id: Option<String>,
}

/// Response for POST /api/chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Body for POST /api/learn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnRequest {
    pub question: String,
    pub answer: String,
}

/// Body for DELETE /api/knowledge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgetRequest {
    pub question: String,
}

/// Response for DELETE /api/knowledge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgetResponse {
    pub deleted: bool,
}

/// Query parameters for GET /api/search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Query parameters for GET /api/history.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub actor_id: Option<String>,
    /// Maximum number of turns to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl HistoryQuery {
    /// Get the effective limit, capped at `MAX_HISTORY_LIMIT`.
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit.min(MAX_HISTORY_LIMIT)
    }
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            actor_id: None,
            limit: default_limit(),
        }
    }
}

/// Maximum allowed limit for history queries.
pub const MAX_HISTORY_LIMIT: usize = 500;

const fn default_limit() -> usize {
    50
}

/// JSON body for error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_actor_optional() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(req.message, "hi");
        assert!(req.actor_id.is_none());
    }

    #[test]
    fn test_history_query_defaults_and_cap() {
        let query = HistoryQuery::default();
        assert_eq!(query.limit, 50);

        let query = HistoryQuery {
            actor_id: None,
            limit: 10_000,
        };
        assert_eq!(query.effective_limit(), MAX_HISTORY_LIMIT);
    }

    #[test]
    fn test_search_query_missing_q() {
        let query: SearchQuery = serde_json::from_str("{}").unwrap();
        assert!(query.q.is_empty());
    }
}
