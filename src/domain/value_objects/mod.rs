//! Value objects - Immutable objects defined by their attributes

mod entity_kind;
mod ids;
mod storage_path;

pub use entity_kind::EntityKind;
pub use ids::*;
pub use storage_path::{StoragePath, DETAILS_KEY};
