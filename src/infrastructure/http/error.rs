//! HTTP error responses

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::application::ports::outbound::ProviderInitializationError;
use crate::application::services::WorldBuilderError;
use crate::infrastructure::auth::AuthError;

/// JSON body returned for error responses
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code
    pub error: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    World(WorldBuilderError),
    Auth(AuthError),
    ProviderInit(ProviderInitializationError),
    /// The user has not called `init-llm` yet
    ProviderNotInitialized,
    EntityNotFound(String),
}

impl From<WorldBuilderError> for ApiError {
    fn from(err: WorldBuilderError) -> Self {
        Self::World(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

impl From<ProviderInitializationError> for ApiError {
    fn from(err: ProviderInitializationError) -> Self {
        Self::ProviderInit(err)
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::World(err) => match err {
                WorldBuilderError::MissingWorldData(_) => {
                    (StatusCode::BAD_REQUEST, "missing_world_data")
                }
                WorldBuilderError::WorldFile(_) => (StatusCode::BAD_REQUEST, "malformed_world_file"),
                WorldBuilderError::LlmGeneration { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "llm_generation_error")
                }
                WorldBuilderError::Unexpected { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                }
            },
            ApiError::Auth(err) => match err {
                AuthError::UsernameTaken(_) => (StatusCode::BAD_REQUEST, "username_taken"),
                AuthError::BlankCredentials => (StatusCode::BAD_REQUEST, "validation_error"),
                AuthError::TokenIssue(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
                AuthError::InvalidCredentials
                | AuthError::MissingToken
                | AuthError::InvalidToken(_)
                | AuthError::MissingSubject => (StatusCode::UNAUTHORIZED, "unauthorized"),
            },
            ApiError::ProviderInit(_) => (StatusCode::BAD_REQUEST, "provider_initialization_failed"),
            ApiError::ProviderNotInitialized => (StatusCode::BAD_REQUEST, "provider_not_initialized"),
            ApiError::EntityNotFound(_) => (StatusCode::NOT_FOUND, "entity_not_found"),
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::World(err) => err.to_string(),
            ApiError::Auth(err) => err.to_string(),
            ApiError::ProviderInit(err) => format!("Failed to initialize LLM provider: {err}"),
            ApiError::ProviderNotInitialized => {
                "LLM provider not initialized. Please call /api/settings/init-llm first.".to_string()
            }
            ApiError::EntityNotFound(name) => format!("Entity '{name}' not found"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.message();

        if status.is_server_error() {
            error!(code, error = %message, "Request failed");
        }

        let mut response = (
            status,
            Json(ErrorBody {
                error: code,
                message,
            }),
        )
            .into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_world_errors_map_to_status() {
        assert_eq!(
            status_of(WorldBuilderError::MissingWorldData("seed first".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(WorldBuilderError::WorldFile("bad json".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(WorldBuilderError::llm("geography", "rate limited").into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthorized_sets_challenge_header() {
        let response = ApiError::Auth(AuthError::MissingToken).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn test_provider_and_entity_errors() {
        assert_eq!(
            status_of(ApiError::ProviderNotInitialized),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ProviderInitializationError::UnknownProvider("llama".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::EntityNotFound("Mira".into())),
            StatusCode::NOT_FOUND
        );
    }
}
