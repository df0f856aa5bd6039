//! World document access, snapshots and session teardown

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{user_session, ApiError};
use crate::domain::document::{EntityMatch, WorldDocument};
use crate::infrastructure::auth::AuthUser;
use crate::infrastructure::state::AppState;

pub fn world_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/world", get(get_world))
        .route("/api/world/export", get(export_world))
        .route("/api/world/import", post(import_world))
        .route("/api/world/entities", get(list_entities))
        .route("/api/world/entities/{name}", get(get_entity))
        .route("/api/world/session", delete(end_session))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotBody {
    pub snapshot: String,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    pub removed: bool,
}

async fn get_world(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<WorldDocument>, ApiError> {
    let session = user_session(&state, &user)?;
    let document = session.lock().await.document().clone();
    Ok(Json(document))
}

async fn export_world(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<SnapshotBody>, ApiError> {
    let session = user_session(&state, &user)?;
    let snapshot = session.lock().await.export_world()?;
    Ok(Json(SnapshotBody { snapshot }))
}

async fn import_world(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<SnapshotBody>,
) -> Result<Json<ImportResponse>, ApiError> {
    let session = user_session(&state, &user)?;
    session.lock().await.import_world(&body.snapshot)?;
    Ok(Json(ImportResponse { success: true }))
}

async fn list_entities(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<String>>, ApiError> {
    let session = user_session(&state, &user)?;
    let names = session.lock().await.list_entity_names();
    Ok(Json(names))
}

async fn get_entity(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(name): Path<String>,
) -> Result<Json<EntityMatch>, ApiError> {
    let session = user_session(&state, &user)?;
    let found = session.lock().await.find_entity(&name);
    found.map(Json).ok_or(ApiError::EntityNotFound(name))
}

async fn end_session(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Json<EndSessionResponse> {
    Json(EndSessionResponse {
        removed: state.sessions.remove(&user.username),
    })
}
