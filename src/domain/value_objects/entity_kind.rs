use serde::{Deserialize, Serialize};

/// The kinds of named records a world document holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Faction,
    Character,
    Location,
    Artifact,
    Event,
}

impl EntityKind {
    /// Top-level document key under which records of this kind are stored
    pub fn section_key(&self) -> &'static str {
        match self {
            EntityKind::Faction => "factions",
            EntityKind::Character => "characters",
            EntityKind::Location => "locations",
            EntityKind::Artifact => "artifacts",
            EntityKind::Event => "events",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Faction => "faction",
            EntityKind::Character => "character",
            EntityKind::Location => "location",
            EntityKind::Artifact => "artifact",
            EntityKind::Event => "event",
        }
    }

    /// Search order used when resolving an entity by name alone
    pub const LOOKUP_ORDER: [EntityKind; 3] = [
        EntityKind::Character,
        EntityKind::Faction,
        EntityKind::Location,
    ];
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
