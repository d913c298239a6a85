//! MindMesh API Server
//!
//! Serves the notes UI:
//! - Notes CRUD with explicit links and backlinks
//! - Layer classification (factual / creative / emotional)
//! - Semantic search and extractive chat over sentence embeddings
//! - Nudges for notes that have gone stale

use std::io;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use mindmesh_core::{build_embedder, NoteService, Storage};
use mindmesh_server::{build_router, serve, AppState, ServerConfig};

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse flags first so --help/--version work without logging noise
    let config = ServerConfig::parse();
    init_logging(config.log_json);

    info!("MindMesh API v{} starting...", env!("CARGO_PKG_VERSION"));

    let storage = Storage::new(config.db_path.clone()).context("failed to open note database")?;
    info!("Storage initialized at {}", storage.path().display());

    let embedder = build_embedder(config.embedder, config.local_model_path.clone())
        .context("failed to configure embedder")?;
    info!(
        embedder = %config.embedder,
        model = embedder.model_name(),
        "Embedder configured"
    );

    if config.eager_model {
        let warm = Arc::clone(&embedder);
        match tokio::task::spawn_blocking(move || warm.init()).await {
            Ok(Ok(())) => info!("Embedding model loaded"),
            // The failure is memoized; requests needing the model will report it
            Ok(Err(e)) => error!("Failed to load embedding model: {}", e),
            Err(e) => warn!("Model warm-up task failed: {}", e),
        }
    }

    let service = Arc::new(NoteService::new(storage, embedder));
    let router = build_router(AppState::new(service), &config.cors_origins());

    serve(router, &config.bind_address())
        .await
        .with_context(|| format!("server error on {}", config.bind_address()))?;

    Ok(())
}
