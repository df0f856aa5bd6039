//! World generation, interaction simulation and chat

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{user_session, ApiError};
use crate::application::ports::outbound::ChatMessage;
use crate::application::services::llm::compose_raw;
use crate::application::services::world_builder::Descriptions;
use crate::domain::document::WorldDocument;
use crate::infrastructure::auth::AuthUser;
use crate::infrastructure::state::AppState;

pub fn generation_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/generate/seed", post(generate_seed))
        .route("/api/generate/culture", post(generate_culture))
        .route("/api/generate/faction", post(generate_faction))
        .route("/api/generate/character", post(generate_character))
        .route("/api/generate/location", post(generate_location))
        .route("/api/generate/artifact", post(generate_artifact))
        .route("/api/generate/event", post(generate_event))
        .route("/api/generate/interaction", post(simulate_interaction))
        .route("/api/chat", post(chat))
        .route("/api/prompts/preview", post(preview_prompt))
}

#[derive(Debug, Deserialize)]
pub struct SeedRequest {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct CultureRequest {
    pub societal_structure: String,
}

#[derive(Debug, Deserialize)]
pub struct FactionRequest {
    pub name: String,
    pub faction_type: String,
    pub goal: String,
}

#[derive(Debug, Deserialize)]
pub struct CharacterRequest {
    pub name: String,
    pub role: String,
    pub ethnicity: String,
    #[serde(default)]
    pub faction_name: Option<String>,
    #[serde(default)]
    pub quirk: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub name: String,
    pub location_type: String,
    pub brief_description: String,
}

#[derive(Debug, Deserialize)]
pub struct ArtifactRequest {
    pub name: String,
    pub artifact_type: String,
    pub origin: String,
}

#[derive(Debug, Deserialize)]
pub struct EventRequest {
    pub name: String,
    pub event_type: String,
    pub timeframe: String,
}

#[derive(Debug, Deserialize)]
pub struct InteractionRequest {
    pub entity1: String,
    pub entity2: String,
    pub interaction_type: String,
    pub setting: String,
}

#[derive(Debug, Serialize)]
pub struct InteractionResponse {
    pub result: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub category: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub prompt: String,
}

async fn generate_seed(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<SeedRequest>,
) -> Result<Json<Descriptions>, ApiError> {
    let session = user_session(&state, &user)?;
    let mut builder = session.lock().await;
    Ok(Json(builder.generate_world_seed(&req.prompt).await?))
}

async fn generate_culture(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CultureRequest>,
) -> Result<Json<Descriptions>, ApiError> {
    let session = user_session(&state, &user)?;
    let mut builder = session.lock().await;
    Ok(Json(
        builder
            .generate_cultural_tapestry(&req.societal_structure)
            .await?,
    ))
}

async fn generate_faction(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<FactionRequest>,
) -> Result<Json<Descriptions>, ApiError> {
    let session = user_session(&state, &user)?;
    let mut builder = session.lock().await;
    Ok(Json(
        builder
            .generate_faction(&req.name, &req.faction_type, &req.goal)
            .await?,
    ))
}

async fn generate_character(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CharacterRequest>,
) -> Result<Json<Descriptions>, ApiError> {
    let session = user_session(&state, &user)?;
    let mut builder = session.lock().await;
    Ok(Json(
        builder
            .generate_character(
                &req.name,
                &req.role,
                &req.ethnicity,
                req.faction_name.as_deref(),
                req.quirk.as_deref(),
            )
            .await?,
    ))
}

async fn generate_location(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<LocationRequest>,
) -> Result<Json<Descriptions>, ApiError> {
    let session = user_session(&state, &user)?;
    let mut builder = session.lock().await;
    Ok(Json(
        builder
            .generate_location(&req.name, &req.location_type, &req.brief_description)
            .await?,
    ))
}

async fn generate_artifact(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<ArtifactRequest>,
) -> Result<Json<Descriptions>, ApiError> {
    let session = user_session(&state, &user)?;
    let mut builder = session.lock().await;
    Ok(Json(
        builder
            .generate_artifact(&req.name, &req.artifact_type, &req.origin)
            .await?,
    ))
}

async fn generate_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<EventRequest>,
) -> Result<Json<Descriptions>, ApiError> {
    let session = user_session(&state, &user)?;
    let mut builder = session.lock().await;
    Ok(Json(
        builder
            .generate_event(&req.name, &req.event_type, &req.timeframe)
            .await?,
    ))
}

async fn simulate_interaction(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<InteractionRequest>,
) -> Result<Json<InteractionResponse>, ApiError> {
    let session = user_session(&state, &user)?;
    let mut builder = session.lock().await;
    let result = builder
        .simulate_interaction(
            &req.entity1,
            &req.entity2,
            &req.interaction_type,
            &req.setting,
        )
        .await?;
    Ok(Json(InteractionResponse { result }))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let session = user_session(&state, &user)?;
    let builder = session.lock().await;
    let response = builder.chat(&req.messages).await?;
    Ok(Json(ChatResponse { response }))
}

/// Show the prompt a category would send, without calling the provider
async fn preview_prompt(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<PreviewRequest>,
) -> Json<PreviewResponse> {
    let prompt = match state.sessions.get(&user.username) {
        Some(session) => compose_raw(session.lock().await.document(), &req.category, &req.fields),
        None => compose_raw(&WorldDocument::new(), &req.category, &req.fields),
    };
    Json(PreviewResponse { prompt })
}
