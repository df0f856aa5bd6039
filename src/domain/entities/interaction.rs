//! Interaction entity - a simulated encounter between two entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format used for the `timestamp` field of stored interactions
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One entry of the `interactions` list (newest first)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub entities: [String; 2],
    #[serde(rename = "type")]
    pub interaction_type: String,
    pub setting: String,
    pub timestamp: String,
    pub result: String,
}

impl InteractionRecord {
    pub fn new(
        first: impl Into<String>,
        second: impl Into<String>,
        interaction_type: impl Into<String>,
        setting: impl Into<String>,
        result: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            entities: [first.into(), second.into()],
            interaction_type: interaction_type.into(),
            setting: setting.into(),
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            result: result.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_formatting() {
        let at = Utc.with_ymd_and_hms(2026, 1, 15, 10, 30, 5).unwrap();
        let record = InteractionRecord::new("Aria", "Iron Hand", "negotiation", "a tavern", "...", at);
        assert_eq!(record.timestamp, "2026-01-15 10:30:05");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["entities"][1], "Iron Hand");
        assert_eq!(json["type"], "negotiation");
    }
}
