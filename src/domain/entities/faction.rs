//! Faction entity - organised groups pursuing a goal

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A faction as stored under `factions.<name>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionRecord {
    #[serde(rename = "type")]
    pub faction_type: String,
    pub goal: String,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl FactionRecord {
    pub fn new(faction_type: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            faction_type: faction_type.into(),
            goal: goal.into(),
            details: BTreeMap::new(),
        }
    }
}

define_aspects! {
    FactionDetail {
        Description => ("description", "faction_description"),
        Organization => ("organization", "faction_organization"),
        Leadership => ("leadership", "faction_leadership"),
        ValuesIdeology => ("values_ideology", "faction_values"),
        ActivitiesMethods => ("activities_methods", "faction_activities"),
        Relationships => ("relationships", "faction_relationships"),
        ResourcesAssets => ("resources_assets", "faction_resources"),
        HistoryOrigin => ("history_origin", "faction_history"),
    }
}
