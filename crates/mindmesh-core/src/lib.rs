//! # MindMesh Core
//!
//! Note graph engine behind the MindMesh notes UI:
//!
//! - **Note Store**: SQLite (rusqlite) with an explicit link edge table
//! - **Layers**: every note is filed as `factual`, `creative` or `emotional`
//!   by a keyword heuristic
//! - **Semantic Search**: sentence embeddings (fastembed, all-MiniLM-L6-v2)
//!   ranked by cosine similarity over the whole collection
//! - **Chat**: extractive answers built from the note sentences closest to a
//!   question
//! - **Nudges**: stale notes surfaced for revisiting
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mindmesh_core::{CreateNote, HashEmbedder, NoteService, Storage};
//!
//! let storage = Storage::new(None)?;
//! let service = NoteService::new(storage, Arc::new(HashEmbedder::default()));
//!
//! let note = service.create(CreateNote {
//!     title: "Meeting notes".to_string(),
//!     content: Some("todo: call Bob".to_string()),
//!     ..Default::default()
//! })?;
//!
//! let hits = service.search("Bob", 3)?;
//! assert_eq!(hits[0].note.id, note.id);
//! ```
//!
//! ## Feature Flags
//!
//! - `embeddings` (default): local embedding generation with fastembed
//! - `bundled-sqlite` (default): statically linked SQLite
//! - `encryption`: SQLCipher, keyed by `MINDMESH_ENCRYPTION_KEY`

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod classify;
pub mod embeddings;
pub mod graph;
pub mod note;
pub mod nudge;
pub mod search;
pub mod service;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use classify::classify_layer;

pub use embeddings::{
    build_embedder, cosine_similarity, Embedder, EmbedderKind, EmbeddingError, HashEmbedder,
};

#[cfg(feature = "embeddings")]
pub use embeddings::{FastEmbedder, ModelSource};

pub use graph::LinkGraph;

pub use note::{CreateNote, Layer, NewNote, Note, NoteChanges, NoteEmbedding, NoteUpdate, Patch};

pub use nudge::{select_nudges, NudgeFrequency, NUDGE_LIMIT};

pub use search::{extractive_summary, rank_embeddings, split_sentences, ScoredNote};

pub use service::{
    ChatAnswer, GraphEdge, GraphNode, GraphSnapshot, NoteService, ReembedScope, ServiceError,
    ServiceResult,
};

pub use storage::{NoteStats, Result, Storage, StorageError};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default embedding model, used unless a local model directory is configured
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        ChatAnswer, CreateNote, Embedder, Layer, Note, NoteService, NoteUpdate, NudgeFrequency,
        Patch, Result, ScoredNote, Storage, StorageError,
    };
}
