//! Interaction simulation and free-form chat about the world

use chrono::Utc;
use serde_json::Value;
use tracing::{error, info, instrument};

use super::{WorldBuilder, WorldBuilderError};
use crate::application::ports::outbound::{ChatMessage, LlmError, MessageRole};
use crate::application::services::llm::{truncate, world_context_summary};
use crate::domain::document::{CORE_CONCEPT, PHYSICAL_WORLD};
use crate::domain::entities::InteractionRecord;
use crate::domain::value_objects::DETAILS_KEY;

const INTERACTION_CATEGORY: &str = "interaction";
const CHAT_CATEGORY: &str = "chat";
const SUMMARY_FIELD_CHARS: usize = 150;
const HISTORY_CONTEXT_CHARS: usize = 200;

/// Bounded description of one entity for the interaction prompt
fn summarize_entity(name: &str, record: &Value) -> String {
    let text = |value: Option<&Value>| value.and_then(Value::as_str).map(str::to_string);
    let kind = text(record.get("type"))
        .or_else(|| text(record.get("role")))
        .unwrap_or_else(|| "Unknown".to_string());

    let mut parts = vec![format!("Entity: {name} ({kind})")];
    let details = record.get(DETAILS_KEY);
    for (key, label) in [
        ("values_ideology", "Values/Ideology"),
        ("personality", "Personality"),
        ("aspirations_motivations", "Aspirations"),
    ] {
        if let Some(value) = text(details.and_then(|d| d.get(key))) {
            parts.push(format!("{label}: {}", truncate(&value, SUMMARY_FIELD_CHARS)));
        }
    }
    if let Some(goal) = text(record.get("goal")) {
        parts.push(format!("Goal: {}", truncate(&goal, SUMMARY_FIELD_CHARS)));
    }
    parts.join("\n")
}

impl WorldBuilder {
    fn interaction_prompt(
        &self,
        first: (&str, &str),
        second: (&str, &str),
        interaction_type: &str,
        setting: &str,
    ) -> String {
        let core_concept = self.document.root_text(CORE_CONCEPT).unwrap_or("N/A");
        let history = self
            .document
            .section_text(PHYSICAL_WORLD, "history")
            .map(|h| truncate(h, HISTORY_CONTEXT_CHARS))
            .unwrap_or_else(|| "N/A".to_string());

        format!(
            "You are a master storyteller simulating interactions in a fantasy world.\n\
             World Context: Core Concept - {core_concept}. Recent History - {history}\n\n\
             Entities Involved:\n{first_summary}\n\n{second_summary}\n\n\
             Interaction Scenario:\n\
             Simulate a '{interaction_type}' interaction between {first_name} and {second_name}.\n\
             Setting/Context: {setting}\n\n\
             Task:\n\
             Write a detailed narrative of this interaction. Include:\n\
             - Plausible dialogue reflecting their personalities, goals, and relationship (if any).\n\
             - Key actions and decisions made by each entity.\n\
             - The immediate outcome of the interaction.\n\
             - Potential short-term consequences for both entities and their surroundings.\n\
             Maintain consistency with the provided entity summaries and world context.",
            first_name = first.0,
            first_summary = first.1,
            second_name = second.0,
            second_summary = second.1,
        )
    }

    /// Narrate an encounter between two existing entities and record it
    #[instrument(skip(self))]
    pub async fn simulate_interaction(
        &mut self,
        entity1: &str,
        entity2: &str,
        interaction_type: &str,
        setting: &str,
    ) -> Result<String, WorldBuilderError> {
        let found1 = self.document.find_entity(entity1);
        let found2 = self.document.find_entity(entity2);

        let (found1, found2) = match (found1, found2) {
            (Some(a), Some(b)) => (a, b),
            (a, b) => {
                let missing: Vec<&str> = [(entity1, a.is_none()), (entity2, b.is_none())]
                    .into_iter()
                    .filter(|(_, is_missing)| *is_missing)
                    .map(|(name, _)| name)
                    .collect();
                return Err(WorldBuilderError::MissingWorldData(format!(
                    "Entity data not found for: {}. Please ensure they have been generated.",
                    missing.join(", ")
                )));
            }
        };

        let summary1 = summarize_entity(entity1, &found1.record);
        let summary2 = summarize_entity(entity2, &found2.record);
        let prompt = self.interaction_prompt(
            (entity1, &summary1),
            (entity2, &summary2),
            interaction_type,
            setting,
        );

        info!("Simulating interaction");
        let result = match self.llm.generate_content(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                return Err(WorldBuilderError::llm(
                    INTERACTION_CATEGORY,
                    "Simulation returned empty content",
                ))
            }
            Err(LlmError::Remote(message)) => {
                error!(error = %message, "LLM error during simulation");
                return Err(WorldBuilderError::llm(INTERACTION_CATEGORY, message));
            }
            Err(LlmError::Unexpected(source)) => {
                return Err(WorldBuilderError::Unexpected {
                    category: INTERACTION_CATEGORY.to_string(),
                    source,
                })
            }
        };

        let record = InteractionRecord::new(
            entity1,
            entity2,
            interaction_type,
            setting,
            result.clone(),
            Utc::now(),
        );
        self.document.push_interaction(&record)?;

        info!("Interaction simulation complete");
        Ok(result)
    }

    /// Answer a conversation about the world; nothing is stored
    #[instrument(skip(self, history), fields(messages = history.len()))]
    pub async fn chat(&self, history: &[ChatMessage]) -> Result<String, WorldBuilderError> {
        let summary = world_context_summary(&self.document);
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(if summary.is_empty() {
            "You are a creative assistant helping the user build a fictional world. \
             No world has been generated yet."
                .to_string()
        } else {
            format!(
                "You are a creative assistant helping the user build a fictional world. \
                 Stay consistent with what has been established. World context: {summary}"
            )
        }));
        messages.extend(
            history
                .iter()
                .filter(|m| m.role != MessageRole::System)
                .cloned(),
        );

        match self.llm.get_chat_response(&messages).await {
            Ok(text) if !text.trim().is_empty() => Ok(text),
            Ok(_) => Err(WorldBuilderError::llm(
                CHAT_CATEGORY,
                "Chat returned empty content",
            )),
            Err(LlmError::Remote(message)) => Err(WorldBuilderError::llm(CHAT_CATEGORY, message)),
            Err(LlmError::Unexpected(source)) => Err(WorldBuilderError::Unexpected {
                category: CHAT_CATEGORY.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::super::test_support::ScriptedLlm;
    use super::*;
    use crate::domain::document::INTERACTIONS;
    use serde_json::json;

    async fn world_with_cast(llm: Arc<ScriptedLlm>) -> WorldBuilder {
        let mut builder = WorldBuilder::new(llm);
        builder.generate_world_seed("floating islands").await.unwrap();
        builder
            .generate_cultural_tapestry("clan federation")
            .await
            .unwrap();
        builder
            .generate_faction("Iron Hand", "guild", "hoard sky-iron")
            .await
            .unwrap();
        builder
            .generate_character("Aria", "pilot", "islander", None, None)
            .await
            .unwrap();
        builder
    }

    #[tokio::test]
    async fn test_missing_entities_are_all_listed() {
        let llm = ScriptedLlm::fixed("Narrative.");
        let mut builder = WorldBuilder::new(llm.clone());

        let err = builder
            .simulate_interaction("Ghost", "Phantom", "duel", "a crypt")
            .await
            .unwrap_err();

        let WorldBuilderError::MissingWorldData(message) = err else {
            panic!("expected MissingWorldData");
        };
        assert!(message.contains("Ghost, Phantom"));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_one_missing_entity_is_reported() {
        let mut builder = world_with_cast(ScriptedLlm::fixed("Generated.")).await;

        let err = builder
            .simulate_interaction("Aria", "Phantom", "duel", "a crypt")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Phantom"));
        assert!(!err.to_string().contains("Aria"));
    }

    #[tokio::test]
    async fn test_interactions_are_recorded_newest_first() {
        let mut builder = world_with_cast(ScriptedLlm::fixed("Generated.")).await;

        builder
            .simulate_interaction("Aria", "Iron Hand", "negotiation", "a dockside tavern")
            .await
            .unwrap();
        builder
            .simulate_interaction("Iron Hand", "Aria", "ambush", "a storm front")
            .await
            .unwrap();

        let interactions = builder.document().interactions();
        assert_eq!(interactions.len(), 2);
        assert_eq!(interactions[0].interaction_type, "ambush");
        assert_eq!(interactions[0].entities, ["Iron Hand".to_string(), "Aria".to_string()]);
        assert_eq!(interactions[1].setting, "a dockside tavern");
        assert_eq!(interactions[1].result, "Generated.");
    }

    #[tokio::test]
    async fn test_interaction_prompt_embeds_both_summaries() {
        let seen = Arc::new(Mutex::new(String::new()));
        let captured = seen.clone();
        let llm = ScriptedLlm::new(move |_, prompt| {
            *captured.lock().unwrap() = prompt.to_string();
            Ok("Generated.".to_string())
        });
        let mut builder = world_with_cast(llm).await;

        builder
            .simulate_interaction("Aria", "Iron Hand", "negotiation", "a dockside tavern")
            .await
            .unwrap();

        let prompt = seen.lock().unwrap().clone();
        assert!(prompt.contains("Entity: Aria (pilot)"));
        assert!(prompt.contains("Entity: Iron Hand (guild)"));
        assert!(prompt.contains("Goal: hoard sky-iron"));
        assert!(prompt.contains("Core Concept - floating islands"));
        assert!(prompt.contains("'negotiation'"));
    }

    #[tokio::test]
    async fn test_failed_simulation_records_nothing() {
        let llm = ScriptedLlm::new(|index, _| {
            // Cast setup uses 5 + 9 + 8 + 7 calls
            if index < 29 {
                Ok("Generated.".to_string())
            } else {
                Err(LlmError::Remote("overloaded".to_string()))
            }
        });
        let mut builder = world_with_cast(llm).await;

        let err = builder
            .simulate_interaction("Aria", "Iron Hand", "duel", "a cliff")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorldBuilderError::LlmGeneration { ref category, .. } if category == "interaction"
        ));
        assert!(builder
            .document()
            .get(&crate::domain::value_objects::StoragePath::new([INTERACTIONS]))
            .is_none());
    }

    #[test]
    fn test_summary_truncates_long_fields() {
        let record = json!({
            "role": "pilot",
            "details": { "personality": "p".repeat(400) }
        });
        let summary = summarize_entity("Aria", &record);

        assert!(summary.starts_with("Entity: Aria (pilot)"));
        let line = summary.lines().nth(1).unwrap();
        assert_eq!(line.chars().count(), "Personality: ".len() + SUMMARY_FIELD_CHARS);
        assert!(line.ends_with("..."));
    }

    #[tokio::test]
    async fn test_chat_forwards_latest_message() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = seen.clone();
        let llm = ScriptedLlm::new(move |_, last| {
            captured.lock().unwrap().push(last.to_string());
            Ok("Sure.".to_string())
        });
        let builder = WorldBuilder::new(llm);

        let reply = builder
            .chat(&[ChatMessage::user("Name a city.")])
            .await
            .unwrap();

        assert_eq!(reply, "Sure.");
        assert_eq!(seen.lock().unwrap().as_slice(), ["Name a city."]);
    }

    #[tokio::test]
    async fn test_chat_failure_maps_to_generation_error() {
        let builder = WorldBuilder::new(ScriptedLlm::failing("bad key"));

        let err = builder
            .chat(&[ChatMessage::user("Hello")])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorldBuilderError::LlmGeneration { ref category, ref message }
                if category == "chat" && message == "bad key"
        ));
    }
}
