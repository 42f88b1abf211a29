//! Durable storage: knowledge entries and the conversation log.

mod conversations;
mod entries;
mod error;
mod schema;
mod types;

pub use conversations::ConversationLog;
pub use entries::{EntryStatistics, EntryStore};
pub use error::{StoreError, ValidationError};
pub use schema::{SCHEMA, SCHEMA_VERSION};
pub use types::{
    ConversationTurn, IndexedEntry, KnowledgeEntry, NewEntry, DEFAULT_CATEGORY, DEFAULT_LANGUAGE,
};
