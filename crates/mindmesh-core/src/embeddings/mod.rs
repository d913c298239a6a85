//! Sentence Embeddings Module
//!
//! The [`Embedder`] trait is the seam between the note service and the model
//! that turns text into vectors. The service receives an `Arc<dyn Embedder>`
//! at construction time; nothing here is a process-wide global.
//!
//! Implementations:
//! - [`FastEmbedder`] (`embeddings` feature): local ONNX inference through
//!   fastembed, all-MiniLM-L6-v2 by default or a local model directory
//! - [`HashEmbedder`]: deterministic feature hashing of word tokens, no model
//!   files, for offline development and tests

mod hash;
#[cfg(feature = "embeddings")]
mod local;
mod vector;

pub use hash::{HashEmbedder, HASH_DIMENSIONS};
#[cfg(feature = "embeddings")]
pub use local::{FastEmbedder, ModelSource, BATCH_SIZE, MAX_TEXT_LENGTH};
pub use vector::{cosine_similarity, decode_embedding, encode_embedding, l2_normalize};

use std::path::PathBuf;
use std::sync::Arc;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Embedding error types
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum EmbeddingError {
    /// Failed to initialize the embedding model
    ModelInit(String),
    /// Failed to generate embedding
    EmbeddingFailed(String),
    /// Requested backend is not compiled in or not recognised
    Unsupported(String),
}

impl std::fmt::Display for EmbeddingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingError::ModelInit(e) => write!(f, "Model initialization failed: {}", e),
            EmbeddingError::EmbeddingFailed(e) => write!(f, "Embedding generation failed: {}", e),
            EmbeddingError::Unsupported(e) => write!(f, "Unsupported embedder: {}", e),
        }
    }
}

impl std::error::Error for EmbeddingError {}

// ============================================================================
// EMBEDDER
// ============================================================================

/// Produces fixed-length, L2-normalized vectors for text
pub trait Embedder: Send + Sync {
    /// Name recorded next to every stored embedding
    fn model_name(&self) -> &str;

    /// Embed a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed many texts, preserving order
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Load the model now instead of on first use
    fn init(&self) -> Result<(), EmbeddingError> {
        Ok(())
    }
}

/// Which embedder to construct at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbedderKind {
    /// fastembed ONNX model
    #[default]
    FastEmbed,
    /// Feature-hashing embedder
    Hash,
}

impl EmbedderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedderKind::FastEmbed => "fastembed",
            EmbedderKind::Hash => "hash",
        }
    }
}

impl std::fmt::Display for EmbedderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EmbedderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fastembed" | "onnx" => Ok(EmbedderKind::FastEmbed),
            "hash" | "lexical" => Ok(EmbedderKind::Hash),
            other => Err(format!("unknown embedder '{}': expected fastembed or hash", other)),
        }
    }
}

/// Construct the configured embedder.
///
/// `local_model_path` points fastembed at a local model directory instead of
/// the default public model. It is ignored by the hashing embedder.
pub fn build_embedder(
    kind: EmbedderKind,
    local_model_path: Option<PathBuf>,
) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    match kind {
        EmbedderKind::Hash => Ok(Arc::new(HashEmbedder::default())),
        #[cfg(feature = "embeddings")]
        EmbedderKind::FastEmbed => {
            let source = match local_model_path {
                Some(path) => ModelSource::LocalPath(path),
                None => ModelSource::Default,
            };
            Ok(Arc::new(FastEmbedder::new(source)))
        }
        #[cfg(not(feature = "embeddings"))]
        EmbedderKind::FastEmbed => {
            let _ = local_model_path;
            Err(EmbeddingError::Unsupported(
                "built without the `embeddings` feature; use the hash embedder".to_string(),
            ))
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
