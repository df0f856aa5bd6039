//! Outbound ports - Interfaces that the application requires from external systems

mod llm_port;
mod session_store_port;

pub use llm_port::{ChatMessage, LlmError, LlmPort, MessageRole, ProviderInitializationError};
pub use session_store_port::{SharedWorldBuilder, WorldSessionStore};
