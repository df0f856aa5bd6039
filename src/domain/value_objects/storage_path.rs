//! Addresses inside the world document
//!
//! A storage path is the ordered list of keys leading from the document root to
//! the slot a generated category is written into, e.g.
//! `["factions", "Iron Hand", "details", "leadership"]`.

use super::EntityKind;

/// Key under which every entity record keeps its generated subcategories
pub const DETAILS_KEY: &str = "details";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoragePath(Vec<String>);

impl StoragePath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// A field directly under a top-level section, e.g. `physical_world.geography`
    pub fn section_field(section: &str, field: &str) -> Self {
        Self::new([section, field])
    }

    /// The record of a named entity, e.g. `locations.Aerie Peak`
    pub fn entity(kind: EntityKind, name: &str) -> Self {
        Self::new([kind.section_key(), name])
    }

    /// One generated subcategory of a named entity
    pub fn entity_detail(kind: EntityKind, name: &str, detail: &str) -> Self {
        Self::new([kind.section_key(), name, DETAILS_KEY, detail])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for StoragePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}
