//! The world document - nested record of every generated fact for one session
//!
//! The document is a JSON object tree. Writes go through [`StoragePath`]s so the
//! generation pipeline never has to walk nested maps by hand. `serde_json`'s
//! default map keeps keys sorted, which makes [`WorldDocument::export`]
//! deterministic.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::entities::InteractionRecord;
use super::value_objects::{EntityKind, StoragePath};

pub const CORE_CONCEPT: &str = "core_concept";
pub const PHYSICAL_WORLD: &str = "physical_world";
pub const SOCIETAL_STRUCTURE_IDEA: &str = "societal_structure_idea";
pub const CULTURE: &str = "culture";
pub const INTERACTIONS: &str = "interactions";

/// Top-level keys whose value must be a mapping when present
const MAPPING_SECTIONS: [&str; 7] = [
    PHYSICAL_WORLD,
    CULTURE,
    "factions",
    "characters",
    "locations",
    "artifacts",
    "events",
];

const TEXT_SECTIONS: [&str; 2] = [CORE_CONCEPT, SOCIETAL_STRUCTURE_IDEA];

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Malformed world file: {0}")]
    Malformed(String),

    #[error("Failed to serialize world data: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A named entity found by [`WorldDocument::find_entity`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityMatch {
    pub kind: EntityKind,
    pub name: String,
    pub record: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldDocument {
    root: Map<String, Value>,
}

impl WorldDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard everything and start a new world from `concept`
    pub fn reset_with_concept(&mut self, concept: &str) {
        self.root.clear();
        self.root
            .insert(CORE_CONCEPT.to_string(), Value::String(concept.to_string()));
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn get(&self, path: &StoragePath) -> Option<&Value> {
        let (first, rest) = path.segments().split_first()?;
        rest.iter()
            .try_fold(self.root.get(first)?, |node, key| node.as_object()?.get(key))
    }

    /// Non-empty text stored at `path`
    pub fn text(&self, path: &StoragePath) -> Option<&str> {
        self.get(path)
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
    }

    /// Non-empty text stored directly under the root
    pub fn root_text(&self, key: &str) -> Option<&str> {
        self.root
            .get(key)
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
    }

    pub fn section_text(&self, section: &str, field: &str) -> Option<&str> {
        self.text(&StoragePath::section_field(section, field))
    }

    pub fn core_concept(&self) -> Option<&str> {
        self.root_text(CORE_CONCEPT)
    }

    /// Write `value` at `path`, creating (or replacing non-mapping) intermediate
    /// levels. An empty path is ignored.
    pub fn set(&mut self, path: &StoragePath, value: Value) {
        let Some((last, parents)) = path.segments().split_last() else {
            return;
        };

        let mut node = &mut self.root;
        for key in parents {
            let slot = node
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Value::Object(map) = slot else {
                return;
            };
            node = map;
        }
        node.insert(last.clone(), value);
    }

    pub fn set_root_text(&mut self, key: &str, text: &str) {
        self.root
            .insert(key.to_string(), Value::String(text.to_string()));
    }

    /// True when the top-level `section` is a mapping with at least one entry
    pub fn section_is_populated(&self, section: &str) -> bool {
        self.root
            .get(section)
            .and_then(Value::as_object)
            .is_some_and(|map| !map.is_empty())
    }

    pub fn section(&self, section: &str) -> Option<&Map<String, Value>> {
        self.root.get(section).and_then(Value::as_object)
    }

    pub fn has_entity(&self, kind: EntityKind, name: &str) -> bool {
        self.get(&StoragePath::entity(kind, name)).is_some()
    }

    /// Store `record` under `<kind section>.<name>`, replacing any prior record
    pub fn insert_entity<T: Serialize>(
        &mut self,
        kind: EntityKind,
        name: &str,
        record: &T,
    ) -> Result<(), DocumentError> {
        let value = serde_json::to_value(record)?;
        self.set(&StoragePath::entity(kind, name), value);
        Ok(())
    }

    /// Look an entity up by name across characters, factions and locations
    ///
    /// The returned record is a deep copy; changing it never touches the document.
    pub fn find_entity(&self, name: &str) -> Option<EntityMatch> {
        EntityKind::LOOKUP_ORDER.iter().find_map(|kind| {
            self.get(&StoragePath::entity(*kind, name))
                .map(|record| EntityMatch {
                    kind: *kind,
                    name: name.to_string(),
                    record: record.clone(),
                })
        })
    }

    /// Sorted, deduplicated names of every character and faction
    pub fn list_entity_names(&self) -> Vec<String> {
        let mut names: Vec<String> = [EntityKind::Character, EntityKind::Faction]
            .iter()
            .filter_map(|kind| self.section(kind.section_key()))
            .flat_map(|section| section.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Prepend `record` so the newest interaction comes first
    pub fn push_interaction(&mut self, record: &InteractionRecord) -> Result<(), DocumentError> {
        let value = serde_json::to_value(record)?;
        let slot = self
            .root
            .entry(INTERACTIONS.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(items) => items.insert(0, value),
            other => *other = Value::Array(vec![value]),
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn interactions(&self) -> Vec<InteractionRecord> {
        self.root
            .get(INTERACTIONS)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Serialize the whole document as pretty-printed JSON with sorted keys
    pub fn export(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    /// Replace the whole document with `snapshot`
    ///
    /// The snapshot is fully validated first; on error the current document is
    /// left as it was.
    pub fn import(&mut self, snapshot: &str) -> Result<(), DocumentError> {
        let parsed = Self::parse_snapshot(snapshot)?;
        self.root = parsed;
        Ok(())
    }

    fn parse_snapshot(snapshot: &str) -> Result<Map<String, Value>, DocumentError> {
        let value: Value = serde_json::from_str(snapshot)
            .map_err(|e| DocumentError::Malformed(format!("invalid JSON: {e}")))?;

        let Value::Object(root) = value else {
            return Err(DocumentError::Malformed(
                "top-level value must be an object".to_string(),
            ));
        };

        for key in MAPPING_SECTIONS {
            if let Some(section) = root.get(key) {
                if !section.is_object() {
                    return Err(DocumentError::Malformed(format!(
                        "'{key}' must be an object"
                    )));
                }
            }
        }

        for key in TEXT_SECTIONS {
            if let Some(text) = root.get(key) {
                if !text.is_string() {
                    return Err(DocumentError::Malformed(format!("'{key}' must be a string")));
                }
            }
        }

        if let Some(interactions) = root.get(INTERACTIONS) {
            if !interactions.is_array() {
                return Err(DocumentError::Malformed(format!(
                    "'{INTERACTIONS}' must be an array"
                )));
            }
        }

        Ok(root)
    }
}
