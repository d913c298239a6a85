//! Extractive summaries: the note sentences closest to a question, verbatim.

use std::sync::OnceLock;

use regex::Regex;

use super::rank::top_k;
use crate::embeddings::{cosine_similarity, Embedder, EmbeddingError};

/// Sentences kept in a chat answer
pub const DEFAULT_SUMMARY_SENTENCES: usize = 3;

fn sentence_boundary() -> &'static Regex {
    static BOUNDARY: OnceLock<Regex> = OnceLock::new();
    BOUNDARY.get_or_init(|| Regex::new(r"[.!?]\s+").expect("static regex"))
}

/// Split a document after `.`, `!` or `?` followed by whitespace.
///
/// The punctuation stays with its sentence. Fragments are trimmed and blank
/// ones dropped.
pub fn split_sentences(doc: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in sentence_boundary().find_iter(doc) {
        // punctuation is one ASCII byte
        let end = m.start() + 1;
        sentences.push(&doc[start..end]);
        start = m.end();
    }
    sentences.push(&doc[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pick the `max_sentences` sentences of `docs` most similar to `query` and
/// join them with single spaces, in their original order.
///
/// Returns an empty string when the documents contain no sentences.
pub fn extractive_summary(
    query: &str,
    docs: &[&str],
    embedder: &dyn Embedder,
    max_sentences: usize,
) -> Result<String, EmbeddingError> {
    let sentences: Vec<String> = docs.iter().flat_map(|d| split_sentences(d)).collect();
    if sentences.is_empty() || max_sentences == 0 {
        return Ok(String::new());
    }

    let query_vec = embedder.embed(query)?;
    let refs: Vec<&str> = sentences.iter().map(String::as_str).collect();
    let sentence_vecs = embedder.embed_batch(&refs)?;

    let scored: Vec<(f32, usize)> = sentence_vecs
        .iter()
        .enumerate()
        .map(|(i, v)| (cosine_similarity(&query_vec, v), i))
        .collect();

    let mut picked: Vec<usize> = top_k(scored, max_sentences, |a, b| a.cmp(b))
        .into_iter()
        .map(|(_, i)| i)
        .collect();
    picked.sort_unstable();

    Ok(picked
        .into_iter()
        .map(|i| sentences[i].as_str())
        .collect::<Vec<_>>()
        .join(" "))
}

// ============================================================================
// TESTS
// ============================================================================
