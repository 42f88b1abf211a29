//! HTTP handlers for the knowledge API.

use axum::extract::{Query, State};
use axum::Json;
use tokio_util::sync::CancellationToken;

use super::error::ApiError;
use super::types::{
    ChatRequest, ChatResponse, ForgetRequest, ForgetResponse, HistoryQuery, LearnRequest,
    SearchQuery,
};
use crate::engine::{KnowledgeEngine, LearnOutcome, Statistics};
use crate::store::{ConversationTurn, KnowledgeEntry, NewEntry};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The process-wide engine.
    pub engine: KnowledgeEngine,
    /// Cancellation token for graceful shutdown.
    pub cancel: CancellationToken,
}

impl AppState {
    /// Create new app state with a fresh cancellation token.
    #[must_use]
    pub fn new(engine: KnowledgeEngine) -> Self {
        Self {
            engine,
            cancel: CancellationToken::new(),
        }
    }
}

/// GET /api/knowledge - List all entries.
pub async fn list_knowledge(State(state): State<AppState>) -> Json<Vec<KnowledgeEntry>> {
    Json(state.engine.list_all().await)
}

/// POST /api/knowledge - Create or replace an entry.
pub async fn add_knowledge(
    State(state): State<AppState>,
    Json(body): Json<NewEntry>,
) -> Result<Json<KnowledgeEntry>, ApiError> {
    let entry = state.engine.add(body).await?;
    Ok(Json(entry))
}

/// DELETE /api/knowledge - Forget an entry by question.
pub async fn delete_knowledge(
    State(state): State<AppState>,
    Json(body): Json<ForgetRequest>,
) -> Result<Json<ForgetResponse>, ApiError> {
    let deleted = state.engine.forget(&body.question).await?;
    Ok(Json(ForgetResponse { deleted }))
}

/// GET /api/search?q= - Ranked entries for free text.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<KnowledgeEntry>> {
    Json(state.engine.search(&query.q).await)
}

/// GET /api/stats - Knowledge and conversation totals.
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<Statistics>, ApiError> {
    Ok(Json(state.engine.statistics().await?))
}

/// POST /api/chat - Answer a message.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let response = state
        .engine
        .respond(&body.message, body.actor_id.as_deref())
        .await?;
    Ok(Json(ChatResponse { response }))
}

/// POST /api/learn - Teach a question/answer pair.
pub async fn learn(
    State(state): State<AppState>,
    Json(body): Json<LearnRequest>,
) -> Result<Json<LearnOutcome>, ApiError> {
    let outcome = state
        .engine
        .learn_new_response(&body.question, &body.answer)
        .await?;
    Ok(Json(outcome))
}

/// GET /api/history - Recent conversation turns, newest first.
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ConversationTurn>>, ApiError> {
    let turns = state
        .engine
        .recent_turns(query.actor_id.as_deref(), query.effective_limit())
        .await?;
    Ok(Json(turns))
}
