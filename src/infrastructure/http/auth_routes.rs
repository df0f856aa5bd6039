//! Account registration and login

use axum::{extract::State, routing::get, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ApiError;
use crate::infrastructure::auth::{AuthUser, RegisteredUser};
use crate::infrastructure::state::AppState;

pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/protected", get(protected))
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<RegisteredUser>, ApiError> {
    let user = state.users.register(&req.username, &req.password)?;
    Ok(Json(user))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state.users.authenticate(&req.username, &req.password)?;
    let access_token = state.tokens.issue(&user.username)?;
    tracing::info!(username = %user.username, "User logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        username: user.username,
    }))
}

async fn protected(user: AuthUser) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: format!("Hello {}, you are authenticated.", user.username),
    })
}
