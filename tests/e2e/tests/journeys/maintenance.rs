//! # Maintenance Journey
//!
//! Operator-side workflows: backfilling embeddings, switching models,
//! reopening the database and running without a working model.

use std::sync::Arc;

use mindmesh_core::{
    CreateNote, Embedder, EmbeddingError, HashEmbedder, NoteService, NoteUpdate, Patch,
    ReembedScope, ServiceError, Storage,
};
use mindmesh_e2e_tests::{CountingEmbedder, FailingEmbedder, TestDataFactory, TestDatabaseManager};

// ============================================================================
// RE-EMBED
// ============================================================================

#[test]
fn test_reembed_missing_backfills_only_gaps() {
    let db = TestDatabaseManager::new_temp();
    let notes = TestDataFactory::create_batch(&db.service, 4);
    db.service.storage().set_embedding(notes[1].id, None).unwrap();
    db.service.storage().set_embedding(notes[3].id, None).unwrap();

    let before = db.service.stats().unwrap();
    assert_eq!(before.missing_embeddings(), 2);

    let written = db.service.reembed(ReembedScope::Missing).unwrap();
    assert_eq!(written, 2);
    assert_eq!(db.service.stats().unwrap().missing_embeddings(), 0);

    assert_eq!(db.service.reembed(ReembedScope::Missing).unwrap(), 0);
}

#[test]
fn test_reembed_all_switches_model_without_touching_timestamps() {
    let db = TestDatabaseManager::new_temp();
    let original = TestDataFactory::create_note(&db.service, "Groceries", Some("milk"));

    let wider = NoteService::new(
        Arc::clone(db.service.storage()),
        Arc::new(HashEmbedder::new(64)),
    );
    assert_eq!(wider.reembed(ReembedScope::All).unwrap(), 1);

    let note = wider.get(original.id).unwrap();
    assert_eq!(note.embedding.as_ref().map(Vec::len), Some(64));
    assert_eq!(note.embedding_model.as_deref(), Some("mindmesh/feature-hash-64"));
    assert_eq!(note.updated_at, original.updated_at);

    let stats = wider.stats().unwrap();
    assert_eq!(stats.embedding_models.get("mindmesh/feature-hash-64"), Some(&1));
}

#[test]
fn test_old_dimension_embeddings_are_skipped_after_model_switch() {
    let db = TestDatabaseManager::new_temp();
    TestDataFactory::create_note(&db.service, "Groceries", Some("milk"));

    let wider = NoteService::new(
        Arc::clone(db.service.storage()),
        Arc::new(HashEmbedder::new(64)),
    );

    assert!(wider.search("milk", 3).unwrap().is_empty());
}

// ============================================================================
// PERSISTENCE
// ============================================================================

#[test]
fn test_notes_and_links_survive_reopen() {
    let db = TestDatabaseManager::new_temp();
    let target = TestDataFactory::create_note(&db.service, "Target", Some("body"));
    let source = db
        .service
        .create(CreateNote {
            title: "Source".to_string(),
            link_ids: Some(vec![target.id]),
            tags: Some(vec!["x".to_string(), "y".to_string()]),
            ..Default::default()
        })
        .unwrap();

    let reopened = db.reopen();

    let source_again = reopened.get(source.id).unwrap();
    assert_eq!(source_again, source);
    assert_eq!(reopened.get(target.id).unwrap().backlinks, vec![source.id]);
    assert_eq!(reopened.storage().schema_version().unwrap(), 2);
}

#[test]
fn test_harness_counts_notes() {
    let db = TestDatabaseManager::new_temp();
    assert!(db.is_empty());
    assert!(db.path().exists());

    TestDataFactory::create_batch(&db.service, 3);
    assert_eq!(db.note_count(), 3);
}

#[test]
fn test_storage_opened_directly_sees_service_writes() {
    let db = TestDatabaseManager::new_temp();
    TestDataFactory::create_layered_scenario(&db.service);

    let storage = Storage::new(Some(db.path().clone())).unwrap();
    let stats = storage.stats().unwrap();

    assert_eq!(stats.total_notes, 3);
    assert_eq!(stats.layers.get("factual"), Some(&1));
    assert_eq!(stats.layers.get("creative"), Some(&1));
    assert_eq!(stats.layers.get("emotional"), Some(&1));
}

// ============================================================================
// EMBEDDER BEHAVIOUR
// ============================================================================

#[test]
fn test_metadata_only_update_skips_the_model() {
    let embedder = Arc::new(CountingEmbedder::new());
    let db = TestDatabaseManager::with_embedder(embedder.clone());
    let note = TestDataFactory::create_note(&db.service, "Counted", Some("text"));
    assert_eq!(embedder.calls(), 1);

    db.service
        .update(
            note.id,
            NoteUpdate {
                tags: Patch::Value(vec!["t".to_string()]),
                link_ids: Patch::Value(vec![]),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(embedder.calls(), 1);

    db.service
        .update(
            note.id,
            NoteUpdate {
                title: Patch::Value("Recounted".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(embedder.calls(), 2);
}

#[test]
fn test_failed_model_load_is_reported_and_not_retried() {
    let embedder = Arc::new(FailingEmbedder::new());
    let db = TestDatabaseManager::with_embedder(embedder.clone());

    for _ in 0..3 {
        let err = db
            .service
            .create(CreateNote {
                title: "Unsaved".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Embedding(EmbeddingError::ModelInit(_))
        ));
    }

    assert_eq!(embedder.load_attempts(), 1);
    assert!(db.is_empty());
    assert!(embedder.init().is_err());
}
