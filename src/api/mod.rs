//! HTTP JSON API over the knowledge engine.

mod error;
mod handlers;
mod server;
mod types;

pub use error::ApiError;
pub use handlers::{
    add_knowledge, chat, delete_knowledge, get_history, get_stats, learn, list_knowledge, search,
    AppState,
};
pub use server::ApiServer;
pub use types::{
    ChatRequest, ChatResponse, ErrorResponse, ForgetRequest, ForgetResponse, HistoryQuery,
    LearnRequest, SearchQuery, MAX_HISTORY_LIMIT,
};
