//! Cosine ranking over the note collection.
//!
//! The collection is small, so every stored embedding is scored; there is
//! no index. Only `(id, embedding)` rows are read for scoring, full notes
//! are loaded for the winners alone.

use std::cmp::Ordering;

use serde::Serialize;

use crate::embeddings::{cosine_similarity, decode_embedding};
use crate::note::Note;

/// Notes returned by a search
pub const SEARCH_LIMIT: usize = 3;

/// Notes used as context when answering a chat question
pub const CHAT_CONTEXT_LIMIT: usize = 5;

/// Notes returned alongside a chat answer
pub const CHAT_NOTES_LIMIT: usize = 3;

/// A note with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredNote {
    pub note: Note,
    pub score: f32,
}

/// Keep the `k` highest-scoring items, best first.
///
/// Equal scores keep the order given by `tie`. NaN sorts last.
pub fn top_k<T, F>(mut items: Vec<(f32, T)>, k: usize, tie: F) -> Vec<(f32, T)>
where
    F: Fn(&T, &T) -> Ordering,
{
    items.sort_by(|(sa, a), (sb, b)| {
        let sa = if sa.is_nan() { f32::NEG_INFINITY } else { *sa };
        let sb = if sb.is_nan() { f32::NEG_INFINITY } else { *sb };
        sb.total_cmp(&sa).then_with(|| tie(a, b))
    });
    items.truncate(k);
    items
}

/// Rank stored embeddings by cosine similarity to `query`.
///
/// Takes `(note id, stored embedding text)` rows and returns
/// `(score, note id)` pairs, best first. Rows without an embedding, with
/// text that does not decode, or whose length differs from the query's are
/// skipped. Ties are broken by ascending note id.
pub fn rank_embeddings(
    query: &[f32],
    rows: Vec<(i64, Option<String>)>,
    limit: usize,
) -> Vec<(f32, i64)> {
    let scored: Vec<(f32, i64)> = rows
        .into_iter()
        .filter_map(|(id, text)| {
            let vector = match decode_embedding(&text?) {
                Ok(v) => v,
                Err(e) => {
                    tracing::debug!("Skipping note {}: undecodable embedding: {}", id, e);
                    return None;
                }
            };
            if vector.len() != query.len() {
                tracing::debug!(
                    "Skipping note {}: embedding has {} dims, query has {}",
                    id,
                    vector.len(),
                    query.len()
                );
                return None;
            }
            Some((cosine_similarity(query, &vector), id))
        })
        .collect();

    top_k(scored, limit, |a, b| a.cmp(b))
}

// ============================================================================
// TESTS
// ============================================================================
