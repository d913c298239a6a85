//! SQLite Storage Implementation
//!
//! Notes live in `notes`; links live in `note_links` as `(from, to)` rows.
//! Embeddings are stored as JSON text and decoded when notes are read.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::Serialize;

use crate::embeddings::{decode_embedding, encode_embedding};
use crate::graph::LinkGraph;
use crate::note::{Layer, NewNote, Note, NoteChanges, NoteEmbedding};

/// File name used when no database path is given
pub const DEFAULT_DB_FILE: &str = "mindmesh.db";

const NOTE_COLUMNS: &str =
    "id, title, content, layer, tags, embedding, embedding_model, created_at, updated_at";

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Note not found
    #[error("Note not found: {0}")]
    NotFound(i64),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid timestamp
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// STATS
// ============================================================================

/// Collection-wide counts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NoteStats {
    pub total_notes: i64,
    /// Notes with a stored embedding
    pub embedded_notes: i64,
    pub total_links: i64,
    /// Note count per layer name; notes without a layer count as `unclassified`
    pub layers: BTreeMap<String, i64>,
    /// Embedded note count per model name
    pub embedding_models: BTreeMap<String, i64>,
    pub oldest_note: Option<DateTime<Utc>>,
    pub newest_note: Option<DateTime<Utc>>,
}

impl NoteStats {
    pub fn missing_embeddings(&self) -> i64 {
        self.total_notes - self.embedded_notes
    }
}

// ============================================================================
// STORAGE
// ============================================================================

/// Note store
///
/// Uses separate reader/writer connections for interior mutability.
/// All methods take `&self`, so the store is shared as `Arc<Storage>`.
pub struct Storage {
    path: PathBuf,
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").field("path", &self.path).finish()
    }
}

impl Storage {
    /// Apply PRAGMAs and optional encryption to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        #[cfg(feature = "encryption")]
        {
            if let Ok(key) = std::env::var("MINDMESH_ENCRYPTION_KEY") {
                if !key.is_empty() {
                    conn.pragma_update(None, "key", &key)?;
                }
            }
        }

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;
             PRAGMA temp_store = MEMORY;",
        )?;

        Ok(())
    }

    /// Platform data directory path for the default database
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "mindmesh", "core").ok_or_else(|| {
            StorageError::Init("Could not determine project directories".to_string())
        })?;
        Ok(proj_dirs.data_dir().join(DEFAULT_DB_FILE))
    }

    /// Open or create the database, applying pending migrations
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => Self::default_path()?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let writer_conn = Connection::open(&path)?;
        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        let applied = super::migrations::apply_migrations(&writer_conn)?;
        if applied > 0 {
            tracing::info!("Applied {} migration(s) to {}", applied, path.display());
        }

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            path,
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
        })
    }

    /// Database file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema version currently applied
    pub fn schema_version(&self) -> Result<u32> {
        let reader = self.reader()?;
        Ok(super::migrations::get_current_version(&reader)?)
    }

    fn writer(&self) -> Result<MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))
    }

    fn reader(&self) -> Result<MutexGuard<'_, Connection>> {
        self.reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))
    }

    // ========================================================================
    // ROW MAPPING
    // ========================================================================

    fn format_timestamp(at: DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_timestamp(value: &str, field_name: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(StorageError::InvalidTimestamp(format!(
                        "{} '{}': {}",
                        field_name, value, e
                    ))),
                )
            })
    }

    /// Comma-join tags; `None` when nothing is left after trimming
    fn join_tags(tags: &[String]) -> Option<String> {
        let kept: Vec<&str> = tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if kept.is_empty() {
            None
        } else {
            Some(kept.join(","))
        }
    }

    fn split_tags(raw: Option<&str>) -> Vec<String> {
        raw.map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
    }

    /// Convert a row to a Note with empty link lists
    fn row_to_note(row: &rusqlite::Row) -> rusqlite::Result<Note> {
        let id: i64 = row.get("id")?;
        let layer: Option<String> = row.get("layer")?;
        let tags: Option<String> = row.get("tags")?;
        let embedding: Option<String> = row.get("embedding")?;
        let created_at: String = row.get("created_at")?;
        let updated_at: String = row.get("updated_at")?;

        let embedding = embedding.and_then(|text| match decode_embedding(&text) {
            Ok(vector) => Some(vector),
            Err(e) => {
                tracing::debug!("Ignoring undecodable embedding on note {}: {}", id, e);
                None
            }
        });

        Ok(Note {
            id,
            title: row.get("title")?,
            content: row.get("content")?,
            layer: layer.as_deref().and_then(Layer::parse_name),
            tags: Self::split_tags(tags.as_deref()),
            embedding,
            embedding_model: row.get("embedding_model")?,
            links: vec![],
            backlinks: vec![],
            created_at: Self::parse_timestamp(&created_at, "created_at")?,
            updated_at: Self::parse_timestamp(&updated_at, "updated_at")?,
        })
    }

    fn query_ids(conn: &Connection, sql: &str, id: i64) -> rusqlite::Result<Vec<i64>> {
        let mut stmt = conn.prepare(sql)?;
        let ids = stmt
            .query_map(params![id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    fn outgoing_with(conn: &Connection, id: i64) -> rusqlite::Result<Vec<i64>> {
        Self::query_ids(
            conn,
            "SELECT to_note_id FROM note_links WHERE from_note_id = ?1 ORDER BY to_note_id",
            id,
        )
    }

    fn backlinks_with(conn: &Connection, id: i64) -> rusqlite::Result<Vec<i64>> {
        Self::query_ids(
            conn,
            "SELECT from_note_id FROM note_links WHERE to_note_id = ?1 ORDER BY from_note_id",
            id,
        )
    }

    /// Replace all outgoing links of `from`. Unknown targets are skipped.
    fn replace_links(tx: &Transaction<'_>, from: i64, link_ids: &[i64]) -> rusqlite::Result<()> {
        tx.execute("DELETE FROM note_links WHERE from_note_id = ?1", params![from])?;

        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO note_links (from_note_id, to_note_id)
             SELECT ?1, id FROM notes WHERE id = ?2",
        )?;
        for to in link_ids {
            stmt.execute(params![from, to])?;
        }
        Ok(())
    }

    // ========================================================================
    // NOTES
    // ========================================================================

    /// Insert a note and its links in one transaction
    pub fn create_note(&self, input: NewNote) -> Result<Note> {
        let now = Self::format_timestamp(Utc::now());
        let (embedding, embedding_model) = match &input.embedding {
            Some(e) => (Some(encode_embedding(&e.vector)), Some(e.model.as_str())),
            None => (None, None),
        };

        let id = {
            let mut writer = self.writer()?;
            let tx = writer.transaction()?;

            tx.execute(
                "INSERT INTO notes (title, content, layer, tags, embedding, embedding_model, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![
                    input.title,
                    input.content,
                    input.layer.map(|l| l.as_str()),
                    Self::join_tags(&input.tags),
                    embedding,
                    embedding_model,
                    now,
                ],
            )?;
            let id = tx.last_insert_rowid();

            Self::replace_links(&tx, id, &input.link_ids)?;
            tx.commit()?;
            id
        };

        tracing::debug!("Created note {}", id);
        self.get_note(id)?.ok_or(StorageError::NotFound(id))
    }

    /// Fetch one note with its links and backlinks
    pub fn get_note(&self, id: i64) -> Result<Option<Note>> {
        let reader = self.reader()?;

        let note = reader
            .query_row(
                &format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS),
                params![id],
                Self::row_to_note,
            )
            .optional()?;

        let Some(mut note) = note else {
            return Ok(None);
        };
        note.links = Self::outgoing_with(&reader, id)?;
        note.backlinks = Self::backlinks_with(&reader, id)?;
        Ok(Some(note))
    }

    /// All notes in id order, links resolved
    pub fn list_notes(&self) -> Result<Vec<Note>> {
        let mut notes = {
            let reader = self.reader()?;
            let mut stmt =
                reader.prepare(&format!("SELECT {} FROM notes ORDER BY id", NOTE_COLUMNS))?;
            stmt.query_map([], Self::row_to_note)?
                .collect::<rusqlite::Result<Vec<Note>>>()?
        };

        let graph = LinkGraph::from_edges(self.all_links()?);
        for note in &mut notes {
            note.links = graph.outgoing(note.id);
            note.backlinks = graph.incoming(note.id);
        }
        Ok(notes)
    }

    /// Apply a partial update. Returns `None` when the note does not exist.
    ///
    /// `updated_at` is bumped on every successful call.
    pub fn update_note(&self, id: i64, changes: NoteChanges) -> Result<Option<Note>> {
        self.update_note_with(id, |_| Ok::<_, StorageError>(changes))
    }

    /// Apply a partial update derived from the current row.
    ///
    /// `build` runs inside the write transaction and sees the stored note
    /// (links are not resolved). An error from `build` rolls the update back.
    pub fn update_note_with<F, E>(&self, id: i64, build: F) -> std::result::Result<Option<Note>, E>
    where
        F: FnOnce(&Note) -> std::result::Result<NoteChanges, E>,
        E: From<StorageError>,
    {
        {
            let mut writer = self.writer()?;
            let tx = writer.transaction().map_err(StorageError::from)?;

            let existing = tx
                .query_row(
                    &format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS),
                    params![id],
                    Self::row_to_note,
                )
                .optional()
                .map_err(StorageError::from)?;
            let Some(existing) = existing else {
                return Ok(None);
            };

            let changes = build(&existing)?;

            let title = changes.title.unwrap_or(existing.title);
            let content = changes.content.or(existing.content);
            let tags = changes.tags.unwrap_or(existing.tags);
            let layer = changes.layer.or(existing.layer);

            tx.execute(
                "UPDATE notes SET title = ?1, content = ?2, layer = ?3, tags = ?4, updated_at = ?5
                 WHERE id = ?6",
                params![
                    title,
                    content,
                    layer.map(|l| l.as_str()),
                    Self::join_tags(&tags),
                    Self::format_timestamp(Utc::now()),
                    id,
                ],
            )
            .map_err(StorageError::from)?;

            if let Some(embedding) = &changes.embedding {
                tx.execute(
                    "UPDATE notes SET embedding = ?1, embedding_model = ?2 WHERE id = ?3",
                    params![encode_embedding(&embedding.vector), embedding.model, id],
                )
                .map_err(StorageError::from)?;
            }

            if let Some(link_ids) = &changes.link_ids {
                Self::replace_links(&tx, id, link_ids).map_err(StorageError::from)?;
            }

            tx.commit().map_err(StorageError::from)?;
        }

        tracing::debug!("Updated note {}", id);
        Ok(self.get_note(id)?)
    }

    /// Delete a note; its links in both directions go with it.
    /// Returns whether the note existed.
    pub fn delete_note(&self, id: i64) -> Result<bool> {
        let writer = self.writer()?;
        let rows = writer.execute("DELETE FROM notes WHERE id = ?1", params![id])?;
        if rows > 0 {
            tracing::debug!("Deleted note {}", id);
        }
        Ok(rows > 0)
    }

    // ========================================================================
    // EMBEDDINGS
    // ========================================================================

    /// Raw stored embedding text per note, in id order
    pub fn note_embeddings(&self) -> Result<Vec<(i64, Option<String>)>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT id, embedding FROM notes ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Store or clear a note's embedding without touching `updated_at`.
    /// Returns whether the note exists.
    pub fn set_embedding(&self, id: i64, embedding: Option<&NoteEmbedding>) -> Result<bool> {
        let writer = self.writer()?;
        let rows = writer.execute(
            "UPDATE notes SET embedding = ?1, embedding_model = ?2 WHERE id = ?3",
            params![
                embedding.map(|e| encode_embedding(&e.vector)),
                embedding.map(|e| e.model.as_str()),
                id,
            ],
        )?;
        Ok(rows > 0)
    }

    // ========================================================================
    // LINKS
    // ========================================================================

    /// Every `(from, to)` edge
    pub fn all_links(&self) -> Result<Vec<(i64, i64)>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT from_note_id, to_note_id FROM note_links ORDER BY from_note_id, to_note_id",
        )?;
        let edges = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(edges)
    }

    // ========================================================================
    // STATS
    // ========================================================================

    pub fn stats(&self) -> Result<NoteStats> {
        let reader = self.reader()?;

        let (total_notes, embedded_notes, oldest, newest): (
            i64,
            i64,
            Option<String>,
            Option<String>,
        ) = reader.query_row(
            "SELECT COUNT(*), COUNT(embedding), MIN(created_at), MAX(created_at) FROM notes",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        let total_links: i64 =
            reader.query_row("SELECT COUNT(*) FROM note_links", [], |row| row.get(0))?;

        let mut layers = BTreeMap::new();
        {
            let mut stmt = reader.prepare(
                "SELECT COALESCE(layer, 'unclassified'), COUNT(*) FROM notes GROUP BY 1",
            )?;
            for row in stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get(1)?)))? {
                let (layer, count) = row?;
                layers.insert(layer, count);
            }
        }

        let mut embedding_models = BTreeMap::new();
        {
            let mut stmt = reader.prepare(
                "SELECT embedding_model, COUNT(*) FROM notes
                 WHERE embedding IS NOT NULL AND embedding_model IS NOT NULL
                 GROUP BY embedding_model",
            )?;
            for row in stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get(1)?)))? {
                let (model, count) = row?;
                embedding_models.insert(model, count);
            }
        }

        let oldest_note = oldest
            .as_deref()
            .map(|s| Self::parse_timestamp(s, "created_at"))
            .transpose()?;
        let newest_note = newest
            .as_deref()
            .map(|s| Self::parse_timestamp(s, "created_at"))
            .transpose()?;

        Ok(NoteStats {
            total_notes,
            embedded_notes,
            total_links,
            layers,
            embedding_models,
            oldest_note,
            newest_note,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
