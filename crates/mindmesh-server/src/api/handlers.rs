//! API endpoint handlers

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Json;
use mindmesh_core::search::SEARCH_LIMIT;
use mindmesh_core::{
    CreateNote, GraphSnapshot, Layer, NoteStats, NoteUpdate, NudgeFrequency,
};
use serde::Deserialize;
use serde_json::Value;

use super::error::ApiError;
use super::state::AppState;
use super::views::{note_views, ChatView, NoteView};

/// Depth used by `/graph` when none is given
const DEFAULT_GRAPH_DEPTH: usize = 2;

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct QueryParams {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct NudgeParams {
    pub layer: Option<String>,
    pub frequency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GraphParams {
    pub center: Option<i64>,
    pub depth: Option<usize>,
}

/// Health check
pub async fn health_check() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Create a note
pub async fn create_note(
    State(state): State<AppState>,
    body: Result<Json<CreateNote>, JsonRejection>,
) -> ApiResult<NoteView> {
    let Json(request) = body?;
    let note = state.run(move |svc| svc.create(request)).await?;
    Ok(Json(note.into()))
}

/// List all notes in creation order
pub async fn list_notes(State(state): State<AppState>) -> ApiResult<Vec<NoteView>> {
    let notes = state.run(|svc| svc.list()).await?;
    Ok(Json(note_views(notes)))
}

/// Semantic search, best match first
pub async fn search_notes(
    State(state): State<AppState>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> ApiResult<Vec<NoteView>> {
    let Query(params) = params?;
    let hits = state
        .run(move |svc| svc.search(&params.q, SEARCH_LIMIT))
        .await?;
    Ok(Json(hits.into_iter().map(|hit| hit.note.into()).collect()))
}

/// Get one note
pub async fn get_note(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<NoteView> {
    let Path(id) = id?;
    let note = state.run(move |svc| svc.get(id)).await?;
    Ok(Json(note.into()))
}

/// Partially update a note
pub async fn update_note(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<NoteUpdate>, JsonRejection>,
) -> ApiResult<NoteView> {
    let Path(id) = id?;
    let Json(update) = body?;
    let note = state.run(move |svc| svc.update(id, update)).await?;
    Ok(Json(note.into()))
}

/// Delete a note
pub async fn delete_note(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Value> {
    let Path(id) = id?;
    state.run(move |svc| svc.delete(id)).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Answer a question from the notes
pub async fn chat(
    State(state): State<AppState>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> ApiResult<ChatView> {
    let Query(params) = params?;
    let answer = state.run(move |svc| svc.chat(&params.q)).await?;
    Ok(Json(answer.into()))
}

/// Stale notes worth revisiting
pub async fn get_nudges(
    State(state): State<AppState>,
    params: Result<Query<NudgeParams>, QueryRejection>,
) -> ApiResult<Vec<NoteView>> {
    let Query(params) = params?;

    let layer = params
        .layer
        .as_deref()
        .map(str::parse::<Layer>)
        .transpose()
        .map_err(ApiError::Validation)?;
    let frequency = params
        .frequency
        .as_deref()
        .map(str::parse::<NudgeFrequency>)
        .transpose()
        .map_err(ApiError::Validation)?
        .unwrap_or_default();

    let notes = state.run(move |svc| svc.nudges(layer, frequency)).await?;
    Ok(Json(note_views(notes)))
}

/// Link graph, whole or around a note
pub async fn get_graph(
    State(state): State<AppState>,
    params: Result<Query<GraphParams>, QueryRejection>,
) -> ApiResult<GraphSnapshot> {
    let Query(params) = params?;
    let depth = params.depth.unwrap_or(DEFAULT_GRAPH_DEPTH);
    let graph = state
        .run(move |svc| svc.graph(params.center, depth))
        .await?;
    Ok(Json(graph))
}

/// Collection statistics
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<NoteStats> {
    let stats = state.run(|svc| svc.stats()).await?;
    Ok(Json(stats))
}
