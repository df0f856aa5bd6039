//! Authentication - user directory, access tokens and the request extractor

mod extractor;
mod jwt;
mod users;

use thiserror::Error;

pub use extractor::AuthUser;
pub use jwt::TokenService;
pub use users::{RegisteredUser, UserDirectory};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username already registered: {0}")]
    UsernameTaken(String),

    #[error("Username and password must not be empty")]
    BlankCredentials,

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Could not validate credentials")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("Token has no subject")]
    MissingSubject,

    #[error("Failed to issue access token")]
    TokenIssue(#[source] jsonwebtoken::errors::Error),
}
