//! Server configuration: command-line flags with environment fallbacks.

use std::path::PathBuf;

use clap::Parser;
use mindmesh_core::EmbedderKind;

/// Origins allowed by default (Vite dev server)
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:5174",
    "http://127.0.0.1:5173",
    "http://127.0.0.1:5174",
];

/// MindMesh API server
#[derive(Debug, Clone, Parser)]
#[command(name = "mindmesh-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "HTTP API for the MindMesh note graph")]
pub struct ServerConfig {
    /// Interface to bind
    #[arg(long, env = "MINDMESH_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "MINDMESH_PORT", default_value_t = 8000)]
    pub port: u16,

    /// SQLite database file (default: platform data directory)
    #[arg(long, env = "MINDMESH_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Embedding backend: fastembed or hash
    #[arg(long, env = "MINDMESH_EMBEDDER", default_value = "fastembed")]
    pub embedder: EmbedderKind,

    /// Directory holding a local sentence-transformers ONNX export
    #[arg(long, env = "MINDMESH_LOCAL_MODEL_PATH")]
    pub local_model_path: Option<PathBuf>,

    /// Load the embedding model at startup instead of on the first request
    #[arg(long, env = "MINDMESH_EAGER_MODEL")]
    pub eager_model: bool,

    /// Allowed CORS origins, comma-separated; `*` allows any origin without credentials
    #[arg(long, env = "MINDMESH_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Emit logs as JSON lines
    #[arg(long, env = "MINDMESH_LOG_JSON")]
    pub log_json: bool,
}

impl ServerConfig {
    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Configured origins, or the dev defaults
    pub fn cors_origins(&self) -> Vec<String> {
        match &self.cors_origins {
            Some(origins) if !origins.is_empty() => origins
                .iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            _ => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}
