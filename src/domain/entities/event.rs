//! Event entity - historical or current happenings

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An event as stored under `events.<name>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "type")]
    pub event_type: String,
    pub timeframe: String,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl EventRecord {
    pub fn new(event_type: impl Into<String>, timeframe: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            timeframe: timeframe.into(),
            details: BTreeMap::new(),
        }
    }
}

define_aspects! {
    EventDetail {
        SummaryDescription => ("summary_description", "event_description"),
        CausesTriggers => ("causes_triggers", "event_causes"),
        MajorHappenings => ("major_happenings", "event_happenings"),
        KeyFiguresGroups => ("key_figures_groups", "event_figures"),
        OutcomeImpact => ("outcome_impact", "event_impact"),
        LongTermConsequences => ("long_term_consequences", "event_consequences"),
    }
}
