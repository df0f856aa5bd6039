//! Domain layer - World data with no external dependencies
//!
//! This layer contains:
//! - Document: the nested world document and its typed paths
//! - Entities: faction, character, location, artifact, event and interaction records
//! - Value Objects: ids, entity kinds, storage paths

pub mod document;
pub mod entities;
pub mod value_objects;
