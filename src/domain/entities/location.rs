//! Location entity - places in the world

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A location as stored under `locations.<name>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(rename = "type")]
    pub location_type: String,
    /// The user's one-line description the details expand on
    pub brief: String,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl LocationRecord {
    pub fn new(location_type: impl Into<String>, brief: impl Into<String>) -> Self {
        Self {
            location_type: location_type.into(),
            brief: brief.into(),
            details: BTreeMap::new(),
        }
    }
}

define_aspects! {
    LocationDetail {
        DetailedDescription => ("detailed_description", "location_description"),
        History => ("history", "location_history"),
        InhabitantsDemographics => ("inhabitants_demographics", "location_inhabitants"),
        PointsOfInterest => ("points_of_interest", "location_poi"),
        EconomyTrade => ("economy_trade", "location_economy"),
        GovernanceLaw => ("governance_law", "location_governance"),
        CultureCustoms => ("culture_customs", "location_culture"),
        SecretsRumors => ("secrets_rumors", "location_secrets"),
    }
}
