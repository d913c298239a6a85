//! Note - the fundamental unit of the note graph
//!
//! Each note carries:
//! - Title, optional body and ordered tags
//! - A coarse layer classification
//! - An optional sentence embedding
//! - Outgoing links and backlinks (resolved note ids)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// LAYER
// ============================================================================

/// Coarse affective/topical classification of a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Meetings, tasks, research, references
    Factual,
    /// Ideas, drafts, stories, designs
    Creative,
    /// Feelings and moods
    Emotional,
}

impl Layer {
    /// All layers in their canonical order
    pub const ALL: [Layer; 3] = [Layer::Factual, Layer::Creative, Layer::Emotional];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Factual => "factual",
            Layer::Creative => "creative",
            Layer::Emotional => "emotional",
        }
    }

    /// Parse from string name. Unknown names yield `None`.
    pub fn parse_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "factual" => Some(Layer::Factual),
            "creative" => Some(Layer::Creative),
            "emotional" => Some(Layer::Emotional),
            _ => None,
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layer::parse_name(s).ok_or_else(|| {
            format!("unknown layer '{}': expected factual, creative or emotional", s)
        })
    }
}

// ============================================================================
// NOTE
// ============================================================================

/// A note as persisted in the store, with its links resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Server-assigned identifier
    pub id: i64,
    pub title: String,
    pub content: Option<String>,
    /// Layer assigned on the last content-affecting write
    pub layer: Option<Layer>,
    /// Tags in the order they were supplied
    pub tags: Vec<String>,
    /// Sentence embedding of `title` + `content`.
    /// `None` when never computed or when the stored text failed to decode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Name of the model that produced `embedding`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    /// Ids this note links to, ascending
    pub links: Vec<i64>,
    /// Ids of notes linking to this note, ascending
    pub backlinks: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Text fed to the embedding model
    pub fn embedding_text(&self) -> String {
        embedding_text(&self.title, self.content.as_deref())
    }

    /// Whether an embedding is stored for this note
    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }
}

/// Text fed to the embedding model for a title/content pair
pub fn embedding_text(title: &str, content: Option<&str>) -> String {
    format!("{}\n\n{}", title, content.unwrap_or(""))
}

/// An embedding together with the model that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEmbedding {
    pub vector: Vec<f32>,
    pub model: String,
}

// ============================================================================
// STORE INPUTS
// ============================================================================

/// Fully resolved input for inserting a note
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewNote {
    pub title: String,
    pub content: Option<String>,
    pub tags: Vec<String>,
    /// Link targets; ids that do not name an existing note are ignored
    pub link_ids: Vec<i64>,
    pub layer: Option<Layer>,
    pub embedding: Option<NoteEmbedding>,
}

/// Partial update applied by the store. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    /// `Some(vec![])` clears all tags
    pub tags: Option<Vec<String>>,
    /// `Some(vec![])` removes every outgoing link
    pub link_ids: Option<Vec<i64>>,
    pub layer: Option<Layer>,
    pub embedding: Option<NoteEmbedding>,
}

// ============================================================================
// TESTS
// ============================================================================
