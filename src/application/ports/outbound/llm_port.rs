//! LLM port - Interface for text generation providers
//!
//! Providers report remote failures through [`LlmError`] rather than through
//! marker strings in the generated text, so a successful `Ok` always carries
//! real model output.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of a message in a chat history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A message in a chat history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    #[cfg(test)]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Failure of a single provider call
#[derive(Debug, Error)]
pub enum LlmError {
    /// The provider could not produce text (HTTP failure, rate limit, no content, ...)
    #[error("{0}")]
    Remote(String),

    /// A fault inside the adapter itself
    #[error("unexpected provider failure: {0}")]
    Unexpected(#[source] anyhow::Error),
}

/// Failure to construct a provider from user supplied settings
#[derive(Debug, Error)]
pub enum ProviderInitializationError {
    #[error("Unknown LLM provider: {0}")]
    UnknownProvider(String),

    #[error("API key is required for {0}")]
    MissingApiKey(String),

    #[error("A model id is required for {0}")]
    MissingModelId(String),

    #[error("Failed to build HTTP client for {provider}: {source}")]
    Client {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Text generation capability
#[async_trait]
pub trait LlmPort: Send + Sync {
    /// Human readable provider name, used in logs
    fn name(&self) -> &str;

    /// Generate free text for a single prompt
    async fn generate_content(&self, prompt: &str) -> Result<String, LlmError>;

    /// Continue a conversation
    async fn get_chat_response(&self, history: &[ChatMessage]) -> Result<String, LlmError>;
}
