//! Vector helpers shared by the embedders, the ranker and the store.

/// Compute cosine similarity between two vectors.
///
/// A zero-norm side is treated as having norm 1, so the result is 0 rather
/// than NaN. Vectors of different length score 0.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot_product = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let norm_a = if norm_a > 0.0 { norm_a.sqrt() } else { 1.0 };
    let norm_b = if norm_b > 0.0 { norm_b.sqrt() } else { 1.0 };

    dot_product / (norm_a * norm_b)
}

/// Scale a vector to unit length. Zero vectors are returned unchanged.
pub fn l2_normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vector {
            *x /= norm;
        }
    }
    vector
}

/// Serialize an embedding for the `notes.embedding` text column
pub fn encode_embedding(vector: &[f32]) -> String {
    // A slice of finite floats always serializes
    serde_json::to_string(vector).unwrap_or_else(|_| "[]".to_string())
}

/// Parse an embedding stored as JSON text
pub fn decode_embedding(text: &str) -> Result<Vec<f32>, serde_json::Error> {
    serde_json::from_str(text)
}

// ============================================================================
// TESTS
// ============================================================================
