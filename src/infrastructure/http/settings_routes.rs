//! Provider selection

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::ApiError;
use crate::infrastructure::auth::AuthUser;
use crate::infrastructure::llm::{build_provider, ProviderKind, ProviderSettings};
use crate::infrastructure::state::AppState;

pub fn settings_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/settings/providers", get(list_providers))
        .route("/api/settings/init-llm", post(init_llm))
}

#[derive(Debug, Serialize)]
pub struct InitLlmResponse {
    pub message: String,
    pub provider: &'static str,
}

/// Display name -> provider key
async fn list_providers() -> Json<BTreeMap<&'static str, &'static str>> {
    Json(
        ProviderKind::ALL
            .iter()
            .map(|kind| (kind.display_name(), kind.key()))
            .collect(),
    )
}

/// Bind the caller's world session to a provider
///
/// A first call creates the session; later calls swap the provider and keep
/// the world generated so far.
async fn init_llm(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(settings): Json<ProviderSettings>,
) -> Result<Json<InitLlmResponse>, ApiError> {
    let llm = build_provider(&settings, &state.config)?;
    let provider = ProviderKind::from_key(&settings.provider_key)
        .map(|kind| kind.display_name())
        .unwrap_or("unknown");

    // A racing first call may have created the session with its own provider;
    // rebinding under the lock makes this call's provider the one that sticks.
    let session = state.sessions.get_or_create(&user.username, Arc::clone(&llm));
    session.lock().await.set_llm(llm);

    Ok(Json(InitLlmResponse {
        message: format!(
            "{provider} initialized and World Builder is ready for user {}",
            user.username
        ),
        provider,
    }))
}
