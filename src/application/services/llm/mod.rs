//! Prompt construction for world generation

pub mod prompt_composer;
pub mod templates;

pub use prompt_composer::{
    compose, compose_raw, truncate, world_context_summary, ArtifactPrompt, CharacterPrompt,
    CulturePrompt, EventPrompt, FactionPrompt, LocationPrompt, PromptInputs, SeedPrompt,
};
