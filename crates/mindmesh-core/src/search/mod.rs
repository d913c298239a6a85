//! Search Module
//!
//! - Brute-force cosine ranking of notes against a query embedding
//! - Extractive summaries for chat answers

mod rank;
mod summarize;

pub use rank::{rank_embeddings, top_k, ScoredNote, CHAT_CONTEXT_LIMIT, CHAT_NOTES_LIMIT, SEARCH_LIMIT};

pub use summarize::{extractive_summary, split_sentences, DEFAULT_SUMMARY_SENTENCES};
