//! Application services - Use case implementations
//!
//! - `llm`: prompt templates and the prompt composer
//! - `world_builder`: the per-user generation pipeline, interaction simulator and chat

pub mod llm;
pub mod world_builder;

pub use world_builder::{WorldBuilder, WorldBuilderError};
