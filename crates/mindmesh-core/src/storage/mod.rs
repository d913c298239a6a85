//! Storage Module
//!
//! SQLite note store with:
//! - Notes with comma-joined tags and JSON-encoded embeddings
//! - An explicit `note_links` edge table with cascading deletes
//! - Versioned migrations applied at open

mod migrations;
mod sqlite;

pub use migrations::{apply_migrations, get_current_version, Migration, MIGRATIONS};
pub use sqlite::{NoteStats, Result, Storage, StorageError, DEFAULT_DB_FILE};
