//! Database schema for the knowledge and conversation stores.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;

use super::error::StoreError;

/// Current schema version for migrations.
pub const SCHEMA_VERSION: u32 = 1;

/// How long a writer waits on the other store's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQL schema shared by both stores.
pub const SCHEMA: &str = r"
PRAGMA journal_mode = WAL;

-- Knowledge entries, keyed by normalized question
CREATE TABLE IF NOT EXISTS knowledge (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    question TEXT NOT NULL,
    normalized_question TEXT NOT NULL UNIQUE,
    answer TEXT NOT NULL,
    category TEXT NOT NULL DEFAULT 'general',
    language TEXT NOT NULL DEFAULT 'hindi',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Conversation turns, append-only
CREATE TABLE IF NOT EXISTS conversations (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    actor_id TEXT,
    input_text TEXT NOT NULL,
    output_text TEXT NOT NULL,
    timestamp TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

INSERT OR IGNORE INTO schema_version (version) VALUES (1);

CREATE INDEX IF NOT EXISTS idx_conversations_actor_id ON conversations(actor_id);
";

/// Open a file-backed connection, creating parent directories and applying the schema.
pub(crate) async fn open_file(path: &Path) -> Result<Connection, StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
    }

    let path: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<Connection, StoreError> {
        let conn = Connection::open(&path).map_err(|source| StoreError::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        tracing::debug!(path = %path.display(), "Opened knowledge database");
        Ok(conn)
    })
    .await
    .map_err(|_| StoreError::TaskCancelled)?
}

/// Open a private in-memory connection with the schema applied.
pub(crate) async fn open_memory() -> Result<Connection, StoreError> {
    tokio::task::spawn_blocking(|| -> Result<Connection, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    })
    .await
    .map_err(|_| StoreError::TaskCancelled)?
}
