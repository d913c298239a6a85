//! Layer Classification
//!
//! Files each note under one of three layers by case-insensitive keyword
//! containment. Lists are checked in priority order (emotional, creative,
//! factual); a note that matches nothing is factual.

use crate::note::Layer;

/// Keywords that mark a note as emotional
pub const EMOTIONAL_KEYWORDS: &[&str] = &[
    "feel", "love", "fear", "anxious", "happy", "sad", "mood", "emotion",
];

/// Keywords that mark a note as creative
pub const CREATIVE_KEYWORDS: &[&str] = &[
    "idea", "brainstorm", "draft", "story", "design", "concept", "poem", "sketch",
];

/// Keywords that mark a note as factual
pub const FACTUAL_KEYWORDS: &[&str] = &[
    "meeting", "notes", "summary", "todo", "task", "research", "cite", "reference",
];

/// Priority order in which keyword lists are tested
const RULES: [(Layer, &[&str]); 3] = [
    (Layer::Emotional, EMOTIONAL_KEYWORDS),
    (Layer::Creative, CREATIVE_KEYWORDS),
    (Layer::Factual, FACTUAL_KEYWORDS),
];

/// Classify a note from its title and optional body.
///
/// Matching is substring containment, so "feeling" counts as "feel" and
/// "redesign" counts as "design".
pub fn classify_layer(title: &str, content: Option<&str>) -> Layer {
    let text = format!("{} \n {}", title, content.unwrap_or("")).to_lowercase();

    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(layer, _)| *layer)
        .unwrap_or(Layer::Factual)
}

// ============================================================================
// TESTS
// ============================================================================
