//! Durable knowledge entry store with an in-memory match index.
//!
//! Writes go through a single `SQLite` connection on `spawn_blocking`; the
//! index is updated while that connection is still locked, so readers always
//! see entries in commit order. Commits from other connections to the same
//! file are picked up by [`EntryStore::refresh`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row, TransactionBehavior};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::error::StoreError;
use super::schema::{open_file, open_memory};
use super::types::{IndexedEntry, KnowledgeEntry, NewEntry};
use crate::normalize::normalize;

const SELECT_ALL: &str = "SELECT id, question, normalized_question, answer, category, language, created_at, updated_at
     FROM knowledge ORDER BY seq ASC";

const UPSERT: &str = "INSERT INTO knowledge (id, question, normalized_question, answer, category, language, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
     ON CONFLICT(normalized_question) DO UPDATE SET
         answer = excluded.answer,
         category = excluded.category,
         language = excluded.language,
         updated_at = excluded.updated_at
     RETURNING id, question, normalized_question, answer, category, language, created_at, updated_at";

const FINGERPRINT: &str = "SELECT COUNT(*), COALESCE(MAX(seq), 0), COALESCE(MAX(updated_at), '')
     FROM knowledge";

/// Entry count and most recent write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStatistics {
    pub count: usize,
    /// `None` when the store is empty.
    pub last_updated: Option<DateTime<Utc>>,
}

/// Live entries in insertion order.
#[derive(Debug, Default)]
pub(crate) struct EntryIndex {
    entries: Vec<IndexedEntry>,
}

impl EntryIndex {
    fn load(conn: &Connection) -> Result<Self, StoreError> {
        let mut index = Self::default();
        let mut stmt = conn.prepare(SELECT_ALL)?;
        let rows = stmt.query_map([], row_to_entry)?;
        for entry in rows {
            index.upsert(entry?);
        }
        Ok(index)
    }

    fn upsert(&mut self, entry: KnowledgeEntry) {
        let indexed = IndexedEntry::new(entry);
        match self
            .entries
            .iter_mut()
            .find(|e| e.entry.normalized_question == indexed.entry.normalized_question)
        {
            Some(slot) => *slot = indexed,
            None => self.entries.push(indexed),
        }
    }

    fn remove(&mut self, normalized_question: &str) {
        self.entries
            .retain(|e| e.entry.normalized_question != normalized_question);
    }
}

/// What the index was last synced against.
///
/// `data_version` only moves on commits from other connections, and those
/// include conversation appends, so the table fingerprint decides whether
/// a reload is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    data_version: i64,
    fingerprint: (i64, i64, String),
}

impl Snapshot {
    fn read(conn: &Connection) -> rusqlite::Result<Self> {
        Ok(Self {
            data_version: conn.query_row("PRAGMA data_version", [], |row| row.get(0))?,
            fingerprint: read_fingerprint(conn)?,
        })
    }
}

fn read_fingerprint(conn: &Connection) -> rusqlite::Result<(i64, i64, String)> {
    conn.query_row(FINGERPRINT, [], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    })
}

/// The connection plus the snapshot it last synced the index to.
#[derive(Debug)]
struct StoreConnection {
    conn: Connection,
    synced: Snapshot,
}

impl StoreConnection {
    /// Run a local write in an immediate transaction.
    ///
    /// The snapshot absorbs the write only when no other connection has
    /// committed since the last sync; otherwise the next refresh reloads.
    fn write<T>(
        &mut self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let before: i64 = tx.query_row("PRAGMA data_version", [], |row| row.get(0))?;
        let value = f(&tx)?;
        let fingerprint = read_fingerprint(&tx)?;
        tx.commit()?;

        if before == self.synced.data_version {
            self.synced.fingerprint = fingerprint;
        }
        Ok(value)
    }
}

/// Knowledge entry store backed by `SQLite`.
#[derive(Debug, Clone)]
pub struct EntryStore {
    conn: Arc<Mutex<StoreConnection>>,
    index: Arc<RwLock<EntryIndex>>,
    path: Option<PathBuf>,
}

impl EntryStore {
    /// Open an entry store at the specified path and load its entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or read.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let conn = open_file(&path).await?;
        Self::from_connection(conn, Some(path)).await
    }

    /// Open an empty in-memory entry store.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let conn = open_memory().await?;
        Self::from_connection(conn, None).await
    }

    async fn from_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self, StoreError> {
        let (conn, index) = tokio::task::spawn_blocking(
            move || -> Result<(StoreConnection, EntryIndex), StoreError> {
                let synced = Snapshot::read(&conn)?;
                let index = EntryIndex::load(&conn)?;
                Ok((StoreConnection { conn, synced }, index))
            },
        )
        .await
        .map_err(|_| StoreError::TaskCancelled)??;

        tracing::debug!(count = index.entries.len(), "Loaded knowledge entries");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            index: Arc::new(RwLock::new(index)),
            path,
        })
    }

    /// Returns the path to the database, if opened from a file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Reload the index if another connection changed the knowledge table
    /// since the last sync. Returns `true` when a reload happened.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    pub async fn refresh(&self) -> Result<bool, StoreError> {
        let conn = self.conn.clone();
        let index = self.index.clone();
        let reloaded = tokio::task::spawn_blocking(move || -> Result<bool, StoreError> {
            let mut store = conn.blocking_lock();
            let current = Snapshot::read(&store.conn)?;
            if current == store.synced {
                return Ok(false);
            }
            let changed = current.fingerprint != store.synced.fingerprint;
            if changed {
                *index.blocking_write() = EntryIndex::load(&store.conn)?;
            }
            store.synced = current;
            Ok(changed)
        })
        .await
        .map_err(|_| StoreError::TaskCancelled)??;

        if reloaded {
            tracing::info!("Reloaded knowledge entries after external change");
        }
        Ok(reloaded)
    }

    /// Create an entry, or replace the answer and labels of the entry whose
    /// question normalizes to the same key. The id and `created_at` of an
    /// existing entry are kept.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` for empty input, or a database error.
    pub async fn add(&self, new_entry: NewEntry) -> Result<KnowledgeEntry, StoreError> {
        let normalized = new_entry.validate()?;
        let id = Uuid::new_v4().to_string();
        let category = new_entry.category_or_default().to_string();
        let language = new_entry.language_or_default().to_string();
        let NewEntry {
            question, answer, ..
        } = new_entry;

        let conn = self.conn.clone();
        let index = self.index.clone();
        let entry = tokio::task::spawn_blocking(move || -> Result<KnowledgeEntry, StoreError> {
            let mut store = conn.blocking_lock();
            // Stamped under the lock so `updated_at` follows commit order.
            let now = Utc::now();
            let entry = store.write(|conn| {
                conn.query_row(
                    UPSERT,
                    params![id, question, normalized, answer, category, language, now],
                    row_to_entry,
                )
            })?;
            index.blocking_write().upsert(entry.clone());
            Ok(entry)
        })
        .await
        .map_err(|_| StoreError::TaskCancelled)??;

        tracing::debug!(id = %entry.id, question = %entry.question, "Stored knowledge entry");
        Ok(entry)
    }

    /// Look up the entry whose normalized question equals the normalized input.
    pub async fn get(&self, question: &str) -> Option<KnowledgeEntry> {
        let key = normalize(question);
        self.index
            .read()
            .await
            .entries
            .iter()
            .find(|e| e.entry.normalized_question == key)
            .map(|e| e.entry.clone())
    }

    /// All live entries in insertion order.
    pub async fn list_all(&self) -> Vec<KnowledgeEntry> {
        self.index
            .read()
            .await
            .entries
            .iter()
            .map(|e| e.entry.clone())
            .collect()
    }

    /// Run `f` over the indexed entries under a shared read guard.
    pub async fn with_entries<R>(&self, f: impl FnOnce(&[IndexedEntry]) -> R) -> R {
        let index = self.index.read().await;
        f(&index.entries)
    }

    /// Remove the entry whose normalized question equals the normalized input.
    ///
    /// Returns `false` when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete statement fails.
    pub async fn delete(&self, question: &str) -> Result<bool, StoreError> {
        let key = normalize(question);
        if key.is_empty() {
            return Ok(false);
        }

        let conn = self.conn.clone();
        let index = self.index.clone();
        let deleted = tokio::task::spawn_blocking(move || -> Result<bool, StoreError> {
            let mut store = conn.blocking_lock();
            let removed = store.write(|conn| {
                conn.execute(
                    "DELETE FROM knowledge WHERE normalized_question = ?1",
                    params![key],
                )
            })?;
            if removed > 0 {
                index.blocking_write().remove(&key);
            }
            Ok(removed > 0)
        })
        .await
        .map_err(|_| StoreError::TaskCancelled)??;

        tracing::debug!(question = %question, deleted, "Delete knowledge entry");
        Ok(deleted)
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        self.index.read().await.entries.len()
    }

    /// Check if the store has no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Entry count and the latest `updated_at` across all entries.
    pub async fn statistics(&self) -> EntryStatistics {
        let index = self.index.read().await;
        EntryStatistics {
            count: index.entries.len(),
            last_updated: index.entries.iter().map(|e| e.entry.updated_at).max(),
        }
    }
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<KnowledgeEntry> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(KnowledgeEntry {
        id,
        question: row.get(1)?,
        normalized_question: row.get(2)?,
        answer: row.get(3)?,
        category: row.get(4)?,
        language: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
