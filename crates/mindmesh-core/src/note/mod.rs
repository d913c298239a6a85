//! Note Module
//!
//! Core note types and the request shapes used to create and edit notes.

mod node;

pub use node::{embedding_text, Layer, NewNote, Note, NoteChanges, NoteEmbedding};

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// PATCH
// ============================================================================

/// A field of a partial update that distinguishes "not sent" from "sent as null".
///
/// Use with `#[serde(default)]`: a missing key stays [`Patch::Absent`],
/// an explicit `null` becomes [`Patch::Null`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// Key not present in the request
    Absent,
    /// Key present with a `null` value
    Null,
    /// Key present with a value
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// Value if one was sent; `null` and absent both collapse to `None`
    pub fn value(self) -> Option<T> {
        match self {
            Patch::Value(v) => Some(v),
            Patch::Absent | Patch::Null => None,
        }
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            Patch::Absent | Patch::Null => None,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_value().serialize(serializer)
    }
}

// ============================================================================
// REQUESTS
// ============================================================================

/// Body of a create request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateNote {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    /// Notes this note links to
    #[serde(default)]
    pub link_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Body of an update request. Only keys sent with a value are applied;
/// absent and `null` both leave a field unchanged.
///
/// | field      | absent    | `null`    | value              |
/// |------------|-----------|-----------|--------------------|
/// | `title`    | unchanged | unchanged | set                |
/// | `content`  | unchanged | unchanged | set (`""` empties) |
/// | `tags`     | unchanged | unchanged | replaced (`[]` clears) |
/// | `link_ids` | unchanged | unchanged | replaced (`[]` clears) |
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteUpdate {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub title: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub content: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub link_ids: Patch<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub tags: Patch<Vec<String>>,
}

impl NoteUpdate {
    /// Whether the update changes the text the embedding is computed from
    pub fn touches_text(&self) -> bool {
        matches!(self.title, Patch::Value(_)) || matches!(self.content, Patch::Value(_))
    }
}

// ============================================================================
// TESTS
// ============================================================================
