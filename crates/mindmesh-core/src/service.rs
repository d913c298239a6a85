//! Note Service
//!
//! The unit the HTTP and CLI layers call. Composes the store, the injected
//! embedder, the layer classifier, the ranker and the summarizer.
//!
//! All methods are synchronous and may block on SQLite or model inference;
//! async callers should run them on a blocking pool.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::classify::classify_layer;
use crate::embeddings::{Embedder, EmbeddingError};
use crate::graph::LinkGraph;
use crate::note::{embedding_text, CreateNote, Layer, NewNote, Note, NoteChanges, NoteEmbedding, NoteUpdate};
use crate::nudge::{select_nudges, NudgeFrequency};
use crate::search::{
    extractive_summary, rank_embeddings, ScoredNote, CHAT_CONTEXT_LIMIT, CHAT_NOTES_LIMIT,
    DEFAULT_SUMMARY_SENTENCES,
};
use crate::storage::{NoteStats, Storage, StorageError};

/// Answer given when no note has a usable embedding
pub const NO_NOTES_ANSWER: &str = "I couldn't find relevant notes yet. Try adding more notes.";

/// Minimum query length for search, in characters
pub const MIN_SEARCH_QUERY_CHARS: usize = 1;

/// Minimum question length for chat, in characters
pub const MIN_CHAT_QUERY_CHARS: usize = 3;

/// Deepest neighbourhood a graph request may ask for
pub const MAX_GRAPH_DEPTH: usize = 3;

/// Cap on nodes returned for a centred graph request
pub const MAX_GRAPH_NODES: usize = 200;

/// Notes embedded per batch during a backfill
const REEMBED_BATCH: usize = 32;

// ============================================================================
// ERRORS
// ============================================================================

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Note not found: {0}")]
    NotFound(i64),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

// ============================================================================
// RESULT TYPES
// ============================================================================

/// Response to a chat question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatAnswer {
    pub answer: String,
    /// Closest notes, best first
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: i64,
    pub title: String,
    pub layer: Option<Layer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub from: i64,
    pub to: i64,
}

/// A set of notes and the links among them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Which notes a re-embed pass touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReembedScope {
    /// Only notes without a usable embedding
    #[default]
    Missing,
    /// Every note
    All,
}

// ============================================================================
// SERVICE
// ============================================================================

pub struct NoteService {
    storage: Arc<Storage>,
    embedder: Arc<dyn Embedder>,
}

impl std::fmt::Debug for NoteService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteService")
            .field("storage", &self.storage)
            .field("embedder", &self.embedder.model_name())
            .finish()
    }
}

impl NoteService {
    pub fn new(storage: impl Into<Arc<Storage>>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            storage: storage.into(),
            embedder,
        }
    }

    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    fn embed_note(&self, title: &str, content: Option<&str>) -> ServiceResult<NoteEmbedding> {
        let vector = self.embedder.embed(&embedding_text(title, content))?;
        Ok(NoteEmbedding {
            vector,
            model: self.embedder.model_name().to_string(),
        })
    }

    fn require_query(q: &str, min_chars: usize) -> ServiceResult<()> {
        if q.chars().count() < min_chars {
            return Err(ServiceError::InvalidInput(format!(
                "query must be at least {} character(s)",
                min_chars
            )));
        }
        Ok(())
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    /// Create a note: classify, embed, persist
    pub fn create(&self, request: CreateNote) -> ServiceResult<Note> {
        let layer = classify_layer(&request.title, request.content.as_deref());
        let embedding = self.embed_note(&request.title, request.content.as_deref())?;

        let note = self.storage.create_note(NewNote {
            title: request.title,
            content: request.content,
            tags: request.tags.unwrap_or_default(),
            link_ids: request.link_ids.unwrap_or_default(),
            layer: Some(layer),
            embedding: Some(embedding),
        })?;

        tracing::info!(note_id = note.id, layer = %layer, "Note created");
        Ok(note)
    }

    pub fn get(&self, id: i64) -> ServiceResult<Note> {
        self.storage.get_note(id)?.ok_or(ServiceError::NotFound(id))
    }

    pub fn list(&self) -> ServiceResult<Vec<Note>> {
        Ok(self.storage.list_notes()?)
    }

    /// Apply a partial update.
    ///
    /// Only fields sent with a value change; `null` and absent are the same.
    /// The embedding is recomputed only when title or content was sent. The
    /// layer is recomputed from the resulting title and content every time.
    /// Both are derived from the row read inside the write transaction.
    pub fn update(&self, id: i64, update: NoteUpdate) -> ServiceResult<Note> {
        let touches_text = update.touches_text();

        let title = update.title.value();
        let content = update.content.value();
        let tags = update.tags.value();
        let link_ids = update.link_ids.value();

        let note = self
            .storage
            .update_note_with(id, |existing| {
                let final_title = title.as_deref().unwrap_or(&existing.title);
                let final_content = content.as_deref().or(existing.content.as_deref());

                let layer = classify_layer(final_title, final_content);
                let embedding = if touches_text {
                    Some(self.embed_note(final_title, final_content)?)
                } else {
                    None
                };

                Ok::<_, ServiceError>(NoteChanges {
                    title,
                    content,
                    tags,
                    link_ids,
                    layer: Some(layer),
                    embedding,
                })
            })?
            .ok_or(ServiceError::NotFound(id))?;

        tracing::info!(note_id = id, reembedded = touches_text, "Note updated");
        Ok(note)
    }

    pub fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.storage.delete_note(id)? {
            return Err(ServiceError::NotFound(id));
        }
        tracing::info!(note_id = id, "Note deleted");
        Ok(())
    }

    // ========================================================================
    // SEARCH & CHAT
    // ========================================================================

    /// Score stored embeddings against `query` and load the winning notes
    fn ranked_notes(&self, query: &[f32], limit: usize) -> ServiceResult<Vec<ScoredNote>> {
        let rows = self.storage.note_embeddings()?;
        let total = rows.len();
        let ranked = rank_embeddings(query, rows, limit);
        tracing::debug!("Ranked {} stored embeddings, kept {}", total, ranked.len());

        let mut scored = Vec::with_capacity(ranked.len());
        for (score, id) in ranked {
            // deleted since the embeddings were read
            if let Some(note) = self.storage.get_note(id)? {
                scored.push(ScoredNote { note, score });
            }
        }
        Ok(scored)
    }

    /// Notes most similar to `q`, best first
    pub fn search(&self, q: &str, limit: usize) -> ServiceResult<Vec<ScoredNote>> {
        Self::require_query(q, MIN_SEARCH_QUERY_CHARS)?;

        let query_vec = self.embedder.embed(q)?;
        self.ranked_notes(&query_vec, limit)
    }

    /// Answer a question with sentences lifted from the closest notes
    pub fn chat(&self, q: &str) -> ServiceResult<ChatAnswer> {
        Self::require_query(q, MIN_CHAT_QUERY_CHARS)?;

        let query_vec = self.embedder.embed(q)?;
        let context = self.ranked_notes(&query_vec, CHAT_CONTEXT_LIMIT)?;

        if context.is_empty() {
            return Ok(ChatAnswer {
                answer: NO_NOTES_ANSWER.to_string(),
                notes: vec![],
            });
        }

        let docs: Vec<&str> = context
            .iter()
            .filter_map(|s| s.note.content.as_deref())
            .filter(|c| !c.is_empty())
            .collect();

        let mut answer =
            extractive_summary(q, &docs, self.embedder.as_ref(), DEFAULT_SUMMARY_SENTENCES)?;

        let notes: Vec<Note> = context
            .into_iter()
            .take(CHAT_NOTES_LIMIT)
            .map(|s| s.note)
            .collect();

        if answer.is_empty() {
            let points = notes
                .iter()
                .map(|n| format!("- {}: {}", n.title, n.content.as_deref().unwrap_or("")))
                .collect::<Vec<_>>()
                .join("\n\n");
            answer = format!(
                "Based on your notes, here are relevant points for '{}':\n{}",
                q, points
            );
        }

        Ok(ChatAnswer { answer, notes })
    }

    // ========================================================================
    // NUDGES, GRAPH, STATS
    // ========================================================================

    pub fn nudges(&self, layer: Option<Layer>, frequency: NudgeFrequency) -> ServiceResult<Vec<Note>> {
        self.nudges_at(layer, frequency, Utc::now())
    }

    /// Nudges as of `now`
    pub fn nudges_at(
        &self,
        layer: Option<Layer>,
        frequency: NudgeFrequency,
        now: DateTime<Utc>,
    ) -> ServiceResult<Vec<Note>> {
        Ok(select_nudges(self.storage.list_notes()?, layer, frequency, now))
    }

    /// The link graph, whole or around `center`.
    ///
    /// `depth` is clamped to `1..=MAX_GRAPH_DEPTH`; a centred view holds at
    /// most [`MAX_GRAPH_NODES`] notes.
    pub fn graph(&self, center: Option<i64>, depth: usize) -> ServiceResult<GraphSnapshot> {
        let notes: BTreeMap<i64, Note> = self
            .storage
            .list_notes()?
            .into_iter()
            .map(|n| (n.id, n))
            .collect();
        let graph = LinkGraph::from_edges(self.storage.all_links()?);

        let ids: Vec<i64> = match center {
            Some(center) => {
                if !notes.contains_key(&center) {
                    return Err(ServiceError::NotFound(center));
                }
                let depth = depth.clamp(1, MAX_GRAPH_DEPTH);
                graph.neighborhood(center, depth, MAX_GRAPH_NODES)
            }
            None => notes.keys().copied().collect(),
        };

        let nodes: Vec<GraphNode> = ids
            .iter()
            .filter_map(|id| notes.get(id))
            .map(|n| GraphNode {
                id: n.id,
                title: n.title.clone(),
                layer: n.layer,
            })
            .collect();

        let members: BTreeSet<i64> = ids.iter().copied().collect();
        let edges = graph
            .edges()
            .into_iter()
            .filter(|(from, to)| members.contains(from) && members.contains(to))
            .map(|(from, to)| GraphEdge { from, to })
            .collect();

        Ok(GraphSnapshot { nodes, edges })
    }

    pub fn stats(&self) -> ServiceResult<NoteStats> {
        Ok(self.storage.stats()?)
    }

    // ========================================================================
    // MAINTENANCE
    // ========================================================================

    /// Compute embeddings with the current embedder. Returns how many notes
    /// were written. `updated_at` is left alone.
    pub fn reembed(&self, scope: ReembedScope) -> ServiceResult<usize> {
        let targets: Vec<Note> = self
            .storage
            .list_notes()?
            .into_iter()
            .filter(|n| scope == ReembedScope::All || !n.has_embedding())
            .collect();

        if targets.is_empty() {
            tracing::info!("No notes to re-embed");
            return Ok(0);
        }

        let model = self.embedder.model_name().to_string();
        let mut written = 0;

        for batch in targets.chunks(REEMBED_BATCH) {
            let texts: Vec<String> = batch.iter().map(Note::embedding_text).collect();
            let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
            let vectors = self.embedder.embed_batch(&refs)?;

            for (note, vector) in batch.iter().zip(vectors) {
                let embedding = NoteEmbedding {
                    vector,
                    model: model.clone(),
                };
                if self.storage.set_embedding(note.id, Some(&embedding))? {
                    written += 1;
                }
            }
            tracing::info!("Re-embedded {}/{} notes", written, targets.len());
        }

        Ok(written)
    }
}

// ============================================================================
// TESTS
// ============================================================================
