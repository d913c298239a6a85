//! Response shapes

use chrono::{DateTime, Utc};
use mindmesh_core::{ChatAnswer, Layer, Note};
use serde::{Deserialize, Serialize};

/// A note as returned to clients. Embeddings are never exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteView {
    pub id: i64,
    pub title: String,
    pub content: Option<String>,
    pub layer: Option<Layer>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Outgoing link targets, ascending
    pub links: Vec<i64>,
    /// Notes linking here, ascending
    pub backlinks: Vec<i64>,
}

impl From<Note> for NoteView {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            layer: note.layer,
            tags: note.tags,
            created_at: note.created_at,
            updated_at: note.updated_at,
            links: note.links,
            backlinks: note.backlinks,
        }
    }
}

pub fn note_views(notes: impl IntoIterator<Item = Note>) -> Vec<NoteView> {
    notes.into_iter().map(NoteView::from).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatView {
    pub answer: String,
    pub notes: Vec<NoteView>,
}

impl From<ChatAnswer> for ChatView {
    fn from(chat: ChatAnswer) -> Self {
        Self {
            answer: chat.answer,
            notes: note_views(chat.notes),
        }
    }
}
