//! Character entity - individual people of the world

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A character as stored under `characters.<name>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub role: String,
    pub ethnicity: String,
    /// Affiliated faction, kept only when it exists in the document
    pub faction: Option<String>,
    #[serde(default)]
    pub quirk: String,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl CharacterRecord {
    pub fn new(
        role: impl Into<String>,
        ethnicity: impl Into<String>,
        faction: Option<String>,
        quirk: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            ethnicity: ethnicity.into(),
            faction,
            quirk: quirk.into(),
            details: BTreeMap::new(),
        }
    }
}

define_aspects! {
    CharacterDetail {
        Appearance => ("appearance", "character_appearance"),
        Personality => ("personality", "character_personality"),
        Backstory => ("backstory", "character_backstory"),
        SkillsAbilities => ("skills_abilities", "character_skills"),
        Relationships => ("relationships", "character_relationships"),
        AspirationsMotivations => ("aspirations_motivations", "character_aspirations"),
        PossessionsEquipment => ("possessions_equipment", "character_possessions"),
    }
}
