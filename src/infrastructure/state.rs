//! Shared application state

use std::sync::Arc;

use crate::application::ports::outbound::WorldSessionStore;
use crate::infrastructure::auth::{TokenService, UserDirectory};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::session::InMemorySessionStore;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    /// Registered accounts (in-memory)
    pub users: UserDirectory,
    pub tokens: TokenService,
    /// One world builder per authenticated user
    pub sessions: Arc<dyn WorldSessionStore>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let tokens = TokenService::from_config(&config);
        Self {
            config,
            users: UserDirectory::new(),
            tokens,
            sessions: Arc::new(InMemorySessionStore::new()),
        }
    }
}
