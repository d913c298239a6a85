//! Test Data Factory
//!
//! Provides utilities for generating test notes:
//! - Single notes with or without links
//! - Batch generation
//! - Pre-built scenarios for common test cases

use mindmesh_core::{CreateNote, Note, NoteService};

/// Factory for creating test data
///
/// # Example
///
/// ```rust,ignore
/// let db = TestDatabaseManager::new_temp();
///
/// let note = TestDataFactory::create_note(&db.service, "Groceries", Some("milk"));
/// let batch = TestDataFactory::create_batch(&db.service, 10);
/// let scenario = TestDataFactory::create_layered_scenario(&db.service);
/// ```
pub struct TestDataFactory;

/// One note per layer
#[derive(Debug, Clone)]
pub struct LayeredScenario {
    pub factual: Note,
    pub creative: Note,
    pub emotional: Note,
}

impl TestDataFactory {
    /// Create a note with a title and optional body
    pub fn create_note(service: &NoteService, title: &str, content: Option<&str>) -> Note {
        service
            .create(CreateNote {
                title: title.to_string(),
                content: content.map(str::to_string),
                ..Default::default()
            })
            .expect("Failed to create note")
    }

    /// Create a note linking to `link_ids`
    pub fn create_linked(service: &NoteService, title: &str, link_ids: &[i64]) -> Note {
        service
            .create(CreateNote {
                title: title.to_string(),
                link_ids: Some(link_ids.to_vec()),
                ..Default::default()
            })
            .expect("Failed to create linked note")
    }

    /// Create a note with tags
    pub fn create_tagged(service: &NoteService, title: &str, tags: &[&str]) -> Note {
        service
            .create(CreateNote {
                title: title.to_string(),
                tags: Some(tags.iter().map(|t| t.to_string()).collect()),
                ..Default::default()
            })
            .expect("Failed to create tagged note")
    }

    /// Create `count` plain notes titled "Note 0", "Note 1", ...
    pub fn create_batch(service: &NoteService, count: usize) -> Vec<Note> {
        (0..count)
            .map(|i| Self::create_note(service, &format!("Note {}", i), Some("plain text")))
            .collect()
    }

    /// Create one factual, one creative and one emotional note
    pub fn create_layered_scenario(service: &NoteService) -> LayeredScenario {
        LayeredScenario {
            factual: Self::create_note(service, "Meeting notes", Some("todo: call Bob")),
            creative: Self::create_note(service, "Startup idea", Some("brainstorm app names")),
            emotional: Self::create_note(service, "Sunday", Some("I love slow mornings")),
        }
    }
}
