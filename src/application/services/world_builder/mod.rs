//! World Builder - the generation pipeline for one user's world
//!
//! A `WorldBuilder` owns a provider and a [`WorldDocument`]. Every generated
//! category goes through [`WorldBuilder::generate_category`], which either writes
//! the provider's text at its storage path or returns a typed error; nothing is
//! written for a failed category.

mod error;
mod generation;
mod interaction;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::application::ports::outbound::{LlmError, LlmPort};
use crate::application::services::llm::{compose, PromptInputs};
use crate::domain::document::{EntityMatch, WorldDocument};
use crate::domain::entities::Aspect;
use crate::domain::value_objects::StoragePath;

pub use error::WorldBuilderError;
pub use generation::Descriptions;

/// What a multi-category operation does when one category fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnFailure {
    /// Return the error; categories already written stay in the document
    Abort,
    /// Log the error and move on to the next category
    Continue,
}

pub struct WorldBuilder {
    llm: Arc<dyn LlmPort>,
    document: WorldDocument,
}

impl WorldBuilder {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self {
            llm,
            document: WorldDocument::new(),
        }
    }

    /// Bind a different provider, keeping the current document
    pub fn set_llm(&mut self, llm: Arc<dyn LlmPort>) {
        info!(
            from = self.provider_name(),
            to = llm.name(),
            "Rebinding world builder provider"
        );
        self.llm = llm;
    }

    pub fn provider_name(&self) -> &str {
        self.llm.name()
    }

    pub fn document(&self) -> &WorldDocument {
        &self.document
    }

    /// Generate one category and store it at `path`
    #[instrument(skip(self, prompt, path), fields(provider = %self.llm.name(), path = %path))]
    pub async fn generate_category(
        &mut self,
        category: &str,
        prompt: &str,
        path: &StoragePath,
    ) -> Result<String, WorldBuilderError> {
        info!("Generating {}", category.replace('_', " "));

        match self.llm.generate_content(prompt).await {
            Ok(text) if !text.trim().is_empty() => {
                self.document.set(path, Value::String(text.clone()));
                debug!(chars = text.chars().count(), "Stored generated text");
                Ok(text)
            }
            Ok(_) => {
                warn!("LLM returned empty content for {}", category);
                Err(WorldBuilderError::llm(
                    category,
                    format!("LLM returned empty content for {category}"),
                ))
            }
            Err(LlmError::Remote(message)) => {
                error!(error = %message, "LLM error for {}", category);
                Err(WorldBuilderError::llm(category, message))
            }
            Err(LlmError::Unexpected(source)) => {
                error!(error = %source, "Unexpected error generating {}", category);
                Err(WorldBuilderError::Unexpected {
                    category: category.to_string(),
                    source,
                })
            }
        }
    }

    /// Generate every aspect of one family in order
    ///
    /// Prompts are composed up front from the document as it was before the
    /// first category ran.
    async fn generate_family<I: PromptInputs>(
        &mut self,
        inputs: &I,
        path_for: impl Fn(I::Aspect) -> StoragePath,
        on_failure: OnFailure,
    ) -> Result<BTreeMap<String, String>, WorldBuilderError> {
        let prompts: Vec<(I::Aspect, String)> = <I::Aspect as Aspect>::all()
            .iter()
            .map(|aspect| (*aspect, compose(&self.document, *aspect, inputs)))
            .collect();

        let mut generated = BTreeMap::new();
        for (aspect, prompt) in prompts {
            match self
                .generate_category(aspect.category(), &prompt, &path_for(aspect))
                .await
            {
                Ok(text) => {
                    generated.insert(aspect.key().to_string(), text);
                }
                Err(err) if on_failure == OnFailure::Continue => {
                    warn!(error = %err, "Skipping {} after failure", aspect.category());
                }
                Err(err) => return Err(err),
            }
        }
        Ok(generated)
    }

    /// Pretty-printed JSON snapshot of the whole document
    pub fn export_world(&self) -> Result<String, WorldBuilderError> {
        Ok(self.document.export()?)
    }

    /// Replace the document with `snapshot`; on error the document is unchanged
    #[instrument(skip(self, snapshot), fields(bytes = snapshot.len()))]
    pub fn import_world(&mut self, snapshot: &str) -> Result<(), WorldBuilderError> {
        self.document.import(snapshot)?;
        info!("World loaded from snapshot");
        Ok(())
    }

    pub fn find_entity(&self, name: &str) -> Option<EntityMatch> {
        self.document.find_entity(name)
    }

    pub fn list_entity_names(&self) -> Vec<String> {
        self.document.list_entity_names()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::application::ports::outbound::{ChatMessage, LlmError, LlmPort};

    type Script = dyn Fn(usize, &str) -> Result<String, LlmError> + Send + Sync;

    /// Provider double answering from a closure of (call index, prompt)
    pub struct ScriptedLlm {
        script: Box<Script>,
        calls: AtomicUsize,
    }

    impl ScriptedLlm {
        pub fn new(
            script: impl Fn(usize, &str) -> Result<String, LlmError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                script: Box::new(script),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn fixed(text: &'static str) -> Arc<Self> {
            Self::new(move |_, _| Ok(text.to_string()))
        }

        pub fn failing(message: &'static str) -> Arc<Self> {
            Self::new(move |_, _| Err(LlmError::Remote(message.to_string())))
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmPort for ScriptedLlm {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate_content(&self, prompt: &str) -> Result<String, LlmError> {
            let index = self.calls.fetch_add(1, Ordering::SeqCst);
            (self.script)(index, prompt)
        }

        async fn get_chat_response(&self, history: &[ChatMessage]) -> Result<String, LlmError> {
            let index = self.calls.fetch_add(1, Ordering::SeqCst);
            let last = history.last().map(|m| m.content.as_str()).unwrap_or_default();
            (self.script)(index, last)
        }
    }
}
