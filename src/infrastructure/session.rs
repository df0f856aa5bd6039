//! In-memory registry of per-user world builders
//!
//! Sessions live for the lifetime of the process; nothing is persisted.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::application::ports::outbound::{LlmPort, SharedWorldBuilder, WorldSessionStore};
use crate::application::services::WorldBuilder;

/// Session registry backed by `DashMap` for concurrent access across users
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, SharedWorldBuilder>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }
}

impl WorldSessionStore for InMemorySessionStore {
    fn get(&self, user: &str) -> Option<SharedWorldBuilder> {
        self.sessions.get(user).map(|entry| Arc::clone(entry.value()))
    }

    fn get_or_create(&self, user: &str, llm: Arc<dyn LlmPort>) -> SharedWorldBuilder {
        // entry() holds the shard lock, so two racing creates yield one session
        let mut created = false;
        let session = {
            let entry = self.sessions.entry(user.to_string()).or_insert_with(|| {
                created = true;
                Arc::new(Mutex::new(WorldBuilder::new(Arc::clone(&llm))))
            });
            Arc::clone(entry.value())
        };

        // len() takes every shard lock; the entry guard must be gone by now
        if created {
            info!(
                user,
                provider = llm.name(),
                sessions = self.session_count(),
                "World session created"
            );
        } else {
            debug!(user, "World session resolved");
        }
        session
    }

    fn remove(&self, user: &str) -> bool {
        let removed = self.sessions.remove(user).is_some();
        if removed {
            info!(user, sessions = self.session_count(), "World session removed");
        }
        removed
    }

    fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::world_builder::test_support::ScriptedLlm;

    #[tokio::test]
    async fn test_get_or_create_reuses_session() {
        let store = InMemorySessionStore::new();
        let first = store.get_or_create("alice", ScriptedLlm::fixed("a"));
        let second = store.get_or_create("alice", ScriptedLlm::fixed("b"));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().await.provider_name(), "scripted");
        assert_eq!(store.session_count(), 1);
    }

    #[tokio::test]
    async fn test_users_get_distinct_sessions() {
        let store = InMemorySessionStore::new();
        let alice = store.get_or_create("alice", ScriptedLlm::fixed("Generated."));
        let bob = store.get_or_create("bob", ScriptedLlm::fixed("Generated."));

        alice
            .lock()
            .await
            .generate_world_seed("floating islands")
            .await
            .unwrap();

        assert!(!Arc::ptr_eq(&alice, &bob));
        assert!(bob.lock().await.document().is_empty());
        assert_eq!(store.session_count(), 2);
    }

    #[test]
    fn test_remove_drops_session() {
        let store = InMemorySessionStore::new();
        store.get_or_create("alice", ScriptedLlm::fixed("a"));

        assert!(store.remove("alice"));
        assert!(!store.remove("alice"));
        assert!(store.get("alice").is_none());
        assert_eq!(store.session_count(), 0);
    }
}
