//! MindMesh HTTP server
//!
//! JSON API over the note graph, consumed by the notes UI.
//! The `mindmesh-server` binary wires configuration, logging and the router;
//! the `mindmesh` binary is the offline admin CLI.

pub mod api;
pub mod config;

pub use api::{build_router, serve, AppState};
pub use config::{ServerConfig, DEFAULT_CORS_ORIGINS};
