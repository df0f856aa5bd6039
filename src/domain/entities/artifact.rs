//! Artifact entity - legendary items

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An artifact as stored under `artifacts.<name>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub origin: String,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl ArtifactRecord {
    pub fn new(artifact_type: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            artifact_type: artifact_type.into(),
            origin: origin.into(),
            details: BTreeMap::new(),
        }
    }
}

define_aspects! {
    ArtifactDetail {
        DescriptionAppearance => ("description_appearance", "artifact_description"),
        HistoryLegend => ("history_legend", "artifact_history"),
        PowersAbilities => ("powers_abilities", "artifact_powers"),
        CreationMaker => ("creation_maker", "artifact_creation"),
        CurrentStatusLocation => ("current_status_location", "artifact_status"),
        CulturalSignificance => ("cultural_significance", "artifact_significance"),
    }
}
