//! Application layer - Use cases orchestrating the domain
//!
//! - Ports: traits for LLM providers and the per-user session registry
//! - Services: the world builder pipeline and the prompt composer

pub mod ports;
pub mod services;
