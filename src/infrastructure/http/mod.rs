//! HTTP REST API routes

mod auth_routes;
mod error;
mod generation_routes;
mod settings_routes;
mod world_routes;


use axum::Router;
use std::sync::Arc;

use crate::application::ports::outbound::SharedWorldBuilder;
use crate::infrastructure::auth::AuthUser;
use crate::infrastructure::state::AppState;

pub use error::ApiError;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(auth_routes::auth_routes())
        .merge(settings_routes::settings_routes())
        .merge(generation_routes::generation_routes())
        .merge(world_routes::world_routes())
}

/// The caller's world session; absent until `init-llm` has been called
fn user_session(state: &AppState, user: &AuthUser) -> Result<SharedWorldBuilder, ApiError> {
    state
        .sessions
        .get(&user.username)
        .ok_or(ApiError::ProviderNotInitialized)
}
