//! Session store port - Registry of per-user world builders
//!
//! Each authenticated user owns at most one [`WorldBuilder`]. Sessions are
//! handed out behind an async mutex so one user's generation calls run one at
//! a time, while different users never wait on each other.

use std::sync::Arc;

use tokio::sync::Mutex;

use super::LlmPort;
use crate::application::services::WorldBuilder;

pub type SharedWorldBuilder = Arc<Mutex<WorldBuilder>>;

pub trait WorldSessionStore: Send + Sync {
    /// The session for `user`, if one was created
    fn get(&self, user: &str) -> Option<SharedWorldBuilder>;

    /// The session for `user`, creating it bound to `llm` when absent
    ///
    /// An existing session is returned unchanged; rebinding its provider is the
    /// caller's decision.
    fn get_or_create(&self, user: &str, llm: Arc<dyn LlmPort>) -> SharedWorldBuilder;

    /// Drop the session for `user`, returning whether one existed
    fn remove(&self, user: &str) -> bool;

    fn session_count(&self) -> usize;
}
