//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Auth: in-memory accounts, JWT access tokens and the request extractor
//! - HTTP: REST API routes
//! - LLM: provider adapters (OpenAI, Anthropic, Gemini, Hugging Face, mock)
//! - Config: Application configuration
//! - Session: per-user world builder registry
//! - State: Shared application state

pub mod auth;
pub mod config;
pub mod http;
pub mod llm;
pub mod session;
pub mod state;
