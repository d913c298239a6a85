//! Test Database Manager
//!
//! Provides isolated database instances for testing:
//! - Temporary databases that are automatically cleaned up
//! - A note service wired to the deterministic hashing embedder
//! - Reopening the same file to check persistence

use std::path::PathBuf;
use std::sync::Arc;

use mindmesh_core::{Embedder, HashEmbedder, NoteService, Storage};
use tempfile::TempDir;

/// Manager for test databases
///
/// Creates an isolated database per test. The temporary directory is
/// deleted when the manager is dropped.
///
/// # Example
///
/// ```rust,ignore
/// let db = TestDatabaseManager::new_temp();
///
/// db.service.create(CreateNote { title: "Groceries".into(), ..Default::default() })?;
///
/// // Database is automatically deleted when `db` goes out of scope
/// ```
pub struct TestDatabaseManager {
    /// The service under test
    pub service: NoteService,
    /// Temporary directory (kept alive to prevent premature deletion)
    _temp_dir: Option<TempDir>,
    /// Path to the database file
    db_path: PathBuf,
}

impl TestDatabaseManager {
    /// Create a new test database in a temporary directory, using the
    /// hashing embedder
    pub fn new_temp() -> Self {
        Self::with_embedder(Arc::new(HashEmbedder::default()))
    }

    /// Create a new test database backed by the given embedder
    pub fn with_embedder(embedder: Arc<dyn Embedder>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test_mindmesh.db");

        let storage = Storage::new(Some(db_path.clone())).expect("Failed to create test storage");

        Self {
            service: NoteService::new(storage, embedder),
            _temp_dir: Some(temp_dir),
            db_path,
        }
    }

    /// Get the database path
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Open a second service on the same database file
    pub fn reopen(&self) -> NoteService {
        let storage =
            Storage::new(Some(self.db_path.clone())).expect("Failed to reopen test storage");
        NoteService::new(storage, Arc::clone(self.service.embedder()))
    }

    /// Check if the database is empty
    pub fn is_empty(&self) -> bool {
        self.note_count() == 0
    }

    /// Get the number of notes in the database
    pub fn note_count(&self) -> i64 {
        self.service
            .stats()
            .map(|s| s.total_notes)
            .unwrap_or(0)
    }
}
