//! # Nudges and Graph Journey
//!
//! Revisiting stale notes and walking the link graph.
//!
//! Nudges are evaluated against an explicit clock so notes written a moment
//! ago can be treated as days old without touching the database.

use chrono::{Duration, Utc};
use mindmesh_core::{Layer, NoteUpdate, NudgeFrequency, Patch, ServiceError};
use mindmesh_e2e_tests::{TestDataFactory, TestDatabaseManager};

// ============================================================================
// NUDGES
// ============================================================================

#[test]
fn test_all_frequency_returns_three_oldest_first() {
    let db = TestDatabaseManager::new_temp();
    let notes = TestDataFactory::create_batch(&db.service, 5);

    // touching the first note makes it the most recently updated
    std::thread::sleep(std::time::Duration::from_millis(5));
    db.service
        .update(
            notes[0].id,
            NoteUpdate {
                tags: Patch::Value(vec!["touched".to_string()]),
                ..Default::default()
            },
        )
        .unwrap();

    let nudges = db.service.nudges(None, NudgeFrequency::All).unwrap();

    let ids: Vec<i64> = nudges.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![notes[1].id, notes[2].id, notes[3].id]);
    assert!(nudges.windows(2).all(|w| w[0].updated_at <= w[1].updated_at));
}

#[test]
fn test_daily_excludes_recent_notes() {
    let db = TestDatabaseManager::new_temp();
    TestDataFactory::create_batch(&db.service, 2);

    assert!(db.service.nudges(None, NudgeFrequency::Daily).unwrap().is_empty());

    let tomorrow = Utc::now() + Duration::hours(25);
    let due = db
        .service
        .nudges_at(None, NudgeFrequency::Daily, tomorrow)
        .unwrap();
    assert_eq!(due.len(), 2);
}

#[test]
fn test_weekly_waits_seven_days() {
    let db = TestDatabaseManager::new_temp();
    TestDataFactory::create_note(&db.service, "Old thought", None);

    let in_three_days = Utc::now() + Duration::days(3);
    let in_eight_days = Utc::now() + Duration::days(8);

    assert!(db
        .service
        .nudges_at(None, NudgeFrequency::Weekly, in_three_days)
        .unwrap()
        .is_empty());
    assert_eq!(
        db.service
            .nudges_at(None, NudgeFrequency::Weekly, in_eight_days)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_nudges_filter_by_layer() {
    let db = TestDatabaseManager::new_temp();
    let scenario = TestDataFactory::create_layered_scenario(&db.service);

    let creative = db
        .service
        .nudges(Some(Layer::Creative), NudgeFrequency::All)
        .unwrap();

    assert_eq!(creative.len(), 1);
    assert_eq!(creative[0].id, scenario.creative.id);
}

// ============================================================================
// GRAPH
// ============================================================================

#[test]
fn test_whole_graph_lists_every_note_and_edge() {
    let db = TestDatabaseManager::new_temp();
    let a = TestDataFactory::create_note(&db.service, "A", None);
    let b = TestDataFactory::create_linked(&db.service, "B", &[a.id]);
    let c = TestDataFactory::create_linked(&db.service, "C", &[b.id]);

    let graph = db.service.graph(None, 2).unwrap();

    let ids: Vec<i64> = graph.nodes.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![a.id, b.id, c.id]);
    assert_eq!(graph.edges.len(), 2);
}

#[test]
fn test_centred_graph_respects_depth_in_both_directions() {
    let db = TestDatabaseManager::new_temp();
    // chain: a <- b <- c <- d
    let a = TestDataFactory::create_note(&db.service, "A", None);
    let b = TestDataFactory::create_linked(&db.service, "B", &[a.id]);
    let c = TestDataFactory::create_linked(&db.service, "C", &[b.id]);
    let d = TestDataFactory::create_linked(&db.service, "D", &[c.id]);

    let near = db.service.graph(Some(b.id), 1).unwrap();
    let mut ids: Vec<i64> = near.nodes.iter().map(|n| n.id).collect();
    assert_eq!(ids[0], b.id);
    ids.sort_unstable();
    assert_eq!(ids, vec![a.id, b.id, c.id]);
    assert_eq!(near.edges.len(), 2);

    let far = db.service.graph(Some(b.id), 2).unwrap();
    assert_eq!(far.nodes.len(), 4);
    assert!(far.nodes.iter().any(|n| n.id == d.id));
}

#[test]
fn test_graph_walk_terminates_on_cycles() {
    let db = TestDatabaseManager::new_temp();
    let a = TestDataFactory::create_note(&db.service, "A", None);
    let b = TestDataFactory::create_linked(&db.service, "B", &[a.id]);
    db.service
        .update(
            a.id,
            NoteUpdate {
                link_ids: Patch::Value(vec![a.id, b.id]),
                ..Default::default()
            },
        )
        .unwrap();

    let graph = db.service.graph(Some(a.id), 3).unwrap();

    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 3);
}

#[test]
fn test_graph_unknown_center_is_not_found() {
    let db = TestDatabaseManager::new_temp();

    assert!(matches!(
        db.service.graph(Some(7), 1),
        Err(ServiceError::NotFound(7))
    ));
}
