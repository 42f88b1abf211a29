//! Append-only conversation log.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::{params, Connection, Row};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::error::StoreError;
use super::schema::{open_file, open_memory};
use super::types::ConversationTurn;

/// Durable record of every exchange the engine answered.
#[derive(Debug, Clone)]
pub struct ConversationLog {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl ConversationLog {
    /// Open a conversation log at the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema cannot be applied.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let conn = open_file(&path).await?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path),
        })
    }

    /// Open an in-memory conversation log for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let conn = open_memory().await?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Returns the path to the database, if opened from a file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append one turn.
    ///
    /// # Errors
    ///
    /// Returns an error if the turn cannot be inserted.
    pub async fn append(&self, turn: &ConversationTurn) -> Result<(), StoreError> {
        let id = turn.id.to_string();
        let actor_id = turn.actor_id.clone();
        let input_text = turn.input_text.clone();
        let output_text = turn.output_text.clone();
        let timestamp = turn.timestamp;

        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO conversations (id, actor_id, input_text, output_text, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, actor_id, input_text, output_text, timestamp],
            )?;
            Ok(())
        })
        .await
        .map_err(|_| StoreError::TaskCancelled)?
    }

    /// Count all logged turns.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count(&self) -> Result<u64, StoreError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<u64, StoreError> {
            let conn = conn.blocking_lock();
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM conversations", [], |row| row.get(0))?;
            Ok(count.unsigned_abs())
        })
        .await
        .map_err(|_| StoreError::TaskCancelled)?
    }

    /// Most recent turns, newest first. With `actor_id` set, only that actor's turns.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn recent(
        &self,
        actor_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, StoreError> {
        let actor_id = actor_id.map(str::to_string);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<ConversationTurn>, StoreError> {
            let conn = conn.blocking_lock();
            let turns = match actor_id {
                Some(actor_id) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, actor_id, input_text, output_text, timestamp
                         FROM conversations WHERE actor_id = ?1 ORDER BY seq DESC LIMIT ?2",
                    )?;
                    let rows = stmt.query_map(params![actor_id, limit], row_to_turn)?;
                    rows.collect::<Result<Vec<_>, _>>()?
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, actor_id, input_text, output_text, timestamp
                         FROM conversations ORDER BY seq DESC LIMIT ?1",
                    )?;
                    let rows = stmt.query_map(params![limit], row_to_turn)?;
                    rows.collect::<Result<Vec<_>, _>>()?
                }
            };
            Ok(turns)
        })
        .await
        .map_err(|_| StoreError::TaskCancelled)?
    }
}

fn row_to_turn(row: &Row<'_>) -> rusqlite::Result<ConversationTurn> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(ConversationTurn {
        id,
        actor_id: row.get(1)?,
        input_text: row.get(2)?,
        output_text: row.get(3)?,
        timestamp: row.get(4)?,
    })
}
