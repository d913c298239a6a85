//! Local Sentence Embeddings
//!
//! Uses fastembed v5.11 for local ONNX inference.
//!
//! ## Models
//!
//! - **Default**: all-MiniLM-L6-v2 (384d), downloaded into the fastembed cache
//! - **Local directory**: any sentence-transformers export with `model.onnx`
//!   (or `onnx/model.onnx`) and the four tokenizer files, mean pooled
//!
//! The model is loaded at most once per embedder, on first use or on an
//! explicit [`Embedder::init`]. A failed load is remembered and reported on
//! every later call instead of being retried.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};

use fastembed::{
    EmbeddingModel, InitOptions, InitOptionsUserDefined, Pooling, TextEmbedding, TokenizerFiles,
    UserDefinedEmbeddingModel,
};

use super::{l2_normalize, Embedder, EmbeddingError};
use crate::DEFAULT_EMBEDDING_MODEL;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Maximum text length in bytes handed to the tokenizer (truncated if longer)
pub const MAX_TEXT_LENGTH: usize = 8192;

/// Batch size for efficient embedding generation
pub const BATCH_SIZE: usize = 32;

/// Tokenizer files every local model directory must provide
const TOKENIZER_FILES: [&str; 4] = [
    "tokenizer.json",
    "config.json",
    "special_tokens_map.json",
    "tokenizer_config.json",
];

// ============================================================================
// MODEL SOURCE
// ============================================================================

/// Where the embedding model comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModelSource {
    /// all-MiniLM-L6-v2 from the fastembed model hub
    #[default]
    Default,
    /// A sentence-transformers directory on disk
    LocalPath(PathBuf),
}

/// Get the default cache directory for fastembed models
/// Uses FASTEMBED_CACHE_PATH env var, or falls back to platform cache directory
fn get_cache_dir() -> PathBuf {
    if let Ok(path) = std::env::var("FASTEMBED_CACHE_PATH") {
        return PathBuf::from(path);
    }

    // macOS: ~/Library/Caches/com.mindmesh.core/fastembed
    // Linux: ~/.cache/core/fastembed
    if let Some(proj_dirs) = directories::ProjectDirs::from("com", "mindmesh", "core") {
        return proj_dirs.cache_dir().join("fastembed");
    }

    if let Some(base_dirs) = directories::BaseDirs::new() {
        return base_dirs.home_dir().join(".cache/mindmesh/fastembed");
    }

    PathBuf::from(".fastembed_cache")
}

fn read_model_file(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))
}

/// Load a sentence-transformers export from disk
fn load_local_model(dir: &Path) -> Result<TextEmbedding, String> {
    let onnx_path = [dir.join("model.onnx"), dir.join("onnx").join("model.onnx")]
        .into_iter()
        .find(|p| p.is_file())
        .ok_or_else(|| format!("no model.onnx found under {}", dir.display()))?;

    let [tokenizer, config, special_tokens, tokenizer_config] =
        TOKENIZER_FILES.map(|name| read_model_file(&dir.join(name)));

    let tokenizer_files = TokenizerFiles {
        tokenizer_file: tokenizer?,
        config_file: config?,
        special_tokens_map_file: special_tokens?,
        tokenizer_config_file: tokenizer_config?,
    };

    let model = UserDefinedEmbeddingModel::new(read_model_file(&onnx_path)?, tokenizer_files)
        .with_pooling(Pooling::Mean);

    TextEmbedding::try_new_from_user_defined(model, InitOptionsUserDefined::default())
        .map_err(|e| format!("Failed to load local model from {}: {}", dir.display(), e))
}

fn load_default_model() -> Result<TextEmbedding, String> {
    let cache_dir = get_cache_dir();

    if let Err(e) = std::fs::create_dir_all(&cache_dir) {
        tracing::warn!("Failed to create cache directory {:?}: {}", cache_dir, e);
    }

    let options = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
        .with_show_download_progress(true)
        .with_cache_dir(cache_dir);

    TextEmbedding::try_new(options).map_err(|e| {
        format!(
            "Failed to initialize all-MiniLM-L6-v2 embedding model: {}. \
            Ensure ONNX runtime is available and model files can be downloaded.",
            e
        )
    })
}

/// Cut `text` to at most [`MAX_TEXT_LENGTH`] bytes on a char boundary
fn truncate(text: &str) -> &str {
    if text.len() <= MAX_TEXT_LENGTH {
        return text;
    }
    let mut end = MAX_TEXT_LENGTH;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

// ============================================================================
// FASTEMBED EMBEDDER
// ============================================================================

/// Sentence embedder backed by a lazily loaded fastembed model
pub struct FastEmbedder {
    source: ModelSource,
    model_name: String,
    model: OnceLock<Result<Mutex<TextEmbedding>, String>>,
}

impl std::fmt::Debug for FastEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedder")
            .field("source", &self.source)
            .field("loaded", &self.model.get().is_some())
            .finish()
    }
}

impl FastEmbedder {
    /// Create an embedder. Nothing is loaded until first use.
    pub fn new(source: ModelSource) -> Self {
        let model_name = match &source {
            ModelSource::Default => DEFAULT_EMBEDDING_MODEL.to_string(),
            ModelSource::LocalPath(path) => format!("local:{}", path.display()),
        };
        Self {
            source,
            model_name,
            model: OnceLock::new(),
        }
    }

    fn get_model(&self) -> Result<MutexGuard<'_, TextEmbedding>, EmbeddingError> {
        let result = self.model.get_or_init(|| {
            tracing::info!("Loading embedding model {}", self.model_name);
            let loaded = match &self.source {
                ModelSource::Default => load_default_model(),
                ModelSource::LocalPath(dir) => load_local_model(dir),
            };
            if let Err(e) = &loaded {
                tracing::error!("{}", e);
            }
            loaded.map(Mutex::new)
        });

        match result {
            Ok(model) => model
                .lock()
                .map_err(|e| EmbeddingError::ModelInit(format!("Lock poisoned: {}", e))),
            Err(err) => Err(EmbeddingError::ModelInit(err.clone())),
        }
    }
}

impl Embedder for FastEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn init(&self) -> Result<(), EmbeddingError> {
        let _model = self.get_model()?;
        Ok(())
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut model = self.get_model()?;

        let embeddings = model
            .embed(vec![truncate(text)], None)
            .map_err(|e| EmbeddingError::EmbeddingFailed(e.to_string()))?;

        embeddings
            .into_iter()
            .next()
            .map(l2_normalize)
            .ok_or_else(|| EmbeddingError::EmbeddingFailed("No embedding generated".to_string()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut model = self.get_model()?;
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let truncated: Vec<&str> = chunk.iter().map(|t| truncate(t)).collect();

            let embeddings = model
                .embed(truncated, None)
                .map_err(|e| EmbeddingError::EmbeddingFailed(e.to_string()))?;

            all_embeddings.extend(embeddings.into_iter().map(l2_normalize));
        }

        Ok(all_embeddings)
    }
}

// ============================================================================
// TESTS
// ============================================================================
