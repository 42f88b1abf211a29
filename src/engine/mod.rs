//! Knowledge engine: matching, learning, forgetting and fallback replies.

mod error;
mod fallback;
mod responder;

pub use error::EngineError;
pub use fallback::{FallbackPicker, FallbackPolicy, DEFAULT_FALLBACKS};
pub use responder::{KnowledgeEngine, LearnOutcome, Statistics};
