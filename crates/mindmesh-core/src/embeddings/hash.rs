//! Feature-hashing embedder
//!
//! Lower-cased alphanumeric tokens are hashed (FNV-1a) into a fixed number of
//! signed buckets and the result is L2-normalized. Texts sharing words get a
//! positive cosine similarity; identical token bags get identical vectors.
//! There is no notion of synonyms, so this is a stand-in for the real model
//! when no model files are available.

use super::{l2_normalize, Embedder, EmbeddingError};

/// Default output dimensions
pub const HASH_DIMENSIONS: usize = 256;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Deterministic bag-of-words embedder
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
    model_name: String,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(HASH_DIMENSIONS)
    }
}

impl HashEmbedder {
    /// Create an embedder with the given output width (at least 1)
    pub fn new(dimensions: usize) -> Self {
        let dimensions = dimensions.max(1);
        Self {
            dimensions,
            model_name: format!("mindmesh/feature-hash-{}", dimensions),
        }
    }

    fn fnv1a(token: &str) -> u64 {
        token.bytes().fold(FNV_OFFSET, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
        })
    }
}

impl Embedder for HashEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0_f32; self.dimensions];

        let lowered = text.to_lowercase();
        for token in lowered.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let hash = Self::fnv1a(token);
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        Ok(l2_normalize(vector))
    }
}

// ============================================================================
// TESTS
// ============================================================================
