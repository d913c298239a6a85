//! # Note Lifecycle Journey
//!
//! A user creates notes, edits them piecemeal, links them together and
//! deletes them. Covers classification on every write, tag ordering, the
//! absent/null/value update rules (null never clears) and link cleanup on delete.

use mindmesh_core::{CreateNote, Layer, NoteUpdate, Patch, ServiceError};
use mindmesh_e2e_tests::{TestDataFactory, TestDatabaseManager};

// ============================================================================
// CREATE
// ============================================================================

#[test]
fn test_create_classifies_by_keyword() {
    let db = TestDatabaseManager::new_temp();
    let scenario = TestDataFactory::create_layered_scenario(&db.service);

    assert_eq!(scenario.factual.layer, Some(Layer::Factual));
    assert_eq!(scenario.creative.layer, Some(Layer::Creative));
    assert_eq!(scenario.emotional.layer, Some(Layer::Emotional));

    let plain = TestDataFactory::create_note(&db.service, "Groceries", None);
    assert_eq!(plain.layer, Some(Layer::Factual));
}

#[test]
fn test_tags_keep_their_order_and_drop_blanks() {
    let db = TestDatabaseManager::new_temp();

    let note = TestDataFactory::create_tagged(&db.service, "Tagged", &["b", "a"]);
    assert_eq!(note.tags, vec!["b", "a"]);

    let blanks = TestDataFactory::create_tagged(&db.service, "Blanks", &["a", "", "b"]);
    let reread = db.service.get(blanks.id).unwrap();
    assert_eq!(reread.tags, vec!["a", "b"]);
}

#[test]
fn test_create_computes_embedding() {
    let db = TestDatabaseManager::new_temp();
    let note = TestDataFactory::create_note(&db.service, "Groceries", Some("milk"));

    assert!(note.has_embedding());
    assert_eq!(
        note.embedding_model.as_deref(),
        Some(db.service.embedder().model_name())
    );
}

#[test]
fn test_unknown_link_ids_are_ignored() {
    let db = TestDatabaseManager::new_temp();
    let target = TestDataFactory::create_note(&db.service, "Target", None);

    let source = TestDataFactory::create_linked(&db.service, "Source", &[target.id, 999, target.id]);

    assert_eq!(source.links, vec![target.id]);
    assert_eq!(db.service.get(target.id).unwrap().backlinks, vec![source.id]);
}

// ============================================================================
// UPDATE
// ============================================================================

#[test]
fn test_content_only_update_leaves_other_fields() {
    let db = TestDatabaseManager::new_temp();
    let target = TestDataFactory::create_note(&db.service, "Target", None);
    let note = db
        .service
        .create(CreateNote {
            title: "Weekend".to_string(),
            content: Some("groceries".to_string()),
            link_ids: Some(vec![target.id]),
            tags: Some(vec!["home".to_string()]),
        })
        .unwrap();
    assert_eq!(note.layer, Some(Layer::Factual));

    let updated = db
        .service
        .update(
            note.id,
            NoteUpdate {
                content: Patch::Value("I love lazy weekends".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.title, "Weekend");
    assert_eq!(updated.tags, vec!["home"]);
    assert_eq!(updated.links, vec![target.id]);
    assert_eq!(updated.content.as_deref(), Some("I love lazy weekends"));
    assert_eq!(updated.layer, Some(Layer::Emotional));
    assert_ne!(updated.embedding, note.embedding);
    assert!(updated.updated_at >= note.updated_at);
}

#[test]
fn test_null_content_and_title_are_ignored() {
    let db = TestDatabaseManager::new_temp();
    let note = TestDataFactory::create_note(&db.service, "Keep me", Some("and my body"));

    let updated = db
        .service
        .update(
            note.id,
            NoteUpdate {
                title: Patch::Null,
                content: Patch::Null,
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.title, "Keep me");
    assert_eq!(updated.content.as_deref(), Some("and my body"));
    assert_eq!(updated.embedding, note.embedding);
    assert_eq!(updated.embedding_model, note.embedding_model);
}

#[test]
fn test_null_content_from_json_does_not_reembed() {
    let embedder = std::sync::Arc::new(mindmesh_e2e_tests::CountingEmbedder::new());
    let db = TestDatabaseManager::with_embedder(embedder.clone());
    let note = TestDataFactory::create_note(&db.service, "Counted", Some("body"));
    assert_eq!(embedder.calls(), 1);

    let body: NoteUpdate = serde_json::from_str(r#"{"content": null}"#).unwrap();
    let updated = db.service.update(note.id, body).unwrap();

    assert_eq!(updated.content.as_deref(), Some("body"));
    assert_eq!(embedder.calls(), 1);
}

#[test]
fn test_empty_lists_clear_tags_and_links() {
    let db = TestDatabaseManager::new_temp();
    let target = TestDataFactory::create_note(&db.service, "Target", None);
    let note = db
        .service
        .create(CreateNote {
            title: "Source".to_string(),
            link_ids: Some(vec![target.id]),
            tags: Some(vec!["x".to_string()]),
            ..Default::default()
        })
        .unwrap();

    let updated = db
        .service
        .update(
            note.id,
            NoteUpdate {
                tags: Patch::Value(vec![]),
                link_ids: Patch::Value(vec![]),
                ..Default::default()
            },
        )
        .unwrap();

    assert!(updated.tags.is_empty());
    assert!(updated.links.is_empty());
    assert!(db.service.get(target.id).unwrap().backlinks.is_empty());
}

#[test]
fn test_tag_only_update_keeps_embedding() {
    let db = TestDatabaseManager::new_temp();
    let note = TestDataFactory::create_note(&db.service, "Stable", Some("text"));

    let updated = db
        .service
        .update(
            note.id,
            NoteUpdate {
                tags: Patch::Value(vec!["new".to_string()]),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.embedding, note.embedding);
    assert_eq!(updated.tags, vec!["new"]);
}

#[test]
fn test_update_missing_note_is_not_found() {
    let db = TestDatabaseManager::new_temp();

    let err = db.service.update(42, NoteUpdate::default()).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(42)));
}

// ============================================================================
// DELETE
// ============================================================================

#[test]
fn test_delete_removes_note_and_its_edges() {
    let db = TestDatabaseManager::new_temp();
    let hub = TestDataFactory::create_note(&db.service, "Hub", None);
    let spoke = TestDataFactory::create_linked(&db.service, "Spoke", &[hub.id]);
    db.service
        .update(
            hub.id,
            NoteUpdate {
                link_ids: Patch::Value(vec![spoke.id]),
                ..Default::default()
            },
        )
        .unwrap();

    db.service.delete(hub.id).unwrap();

    assert!(matches!(db.service.get(hub.id), Err(ServiceError::NotFound(_))));
    assert!(matches!(db.service.delete(hub.id), Err(ServiceError::NotFound(_))));

    let spoke = db.service.get(spoke.id).unwrap();
    assert!(spoke.links.is_empty());
    assert!(spoke.backlinks.is_empty());

    let ids: Vec<i64> = db.service.list().unwrap().iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![spoke.id]);
}

#[test]
fn test_self_links_and_cycles_are_kept() {
    let db = TestDatabaseManager::new_temp();
    let a = TestDataFactory::create_note(&db.service, "A", None);
    let b = TestDataFactory::create_linked(&db.service, "B", &[a.id]);
    let a = db
        .service
        .update(
            a.id,
            NoteUpdate {
                link_ids: Patch::Value(vec![a.id, b.id]),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(a.links, vec![a.id, b.id]);
    assert_eq!(a.backlinks, vec![a.id, b.id]);
}

#[test]
fn test_update_body_from_json() {
    let db = TestDatabaseManager::new_temp();
    let note = TestDataFactory::create_tagged(&db.service, "From the wire", &["keep"]);

    let body: NoteUpdate = serde_json::from_str(r#"{"content": "new body", "tags": null}"#).unwrap();
    let updated = db.service.update(note.id, body).unwrap();

    assert_eq!(updated.content.as_deref(), Some("new body"));
    assert_eq!(updated.tags, vec!["keep"]);
}
