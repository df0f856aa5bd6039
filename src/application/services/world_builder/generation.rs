//! Higher-level generate operations, one per section of the world

use std::collections::BTreeMap;

use tracing::{info, instrument};

use super::{OnFailure, WorldBuilder, WorldBuilderError};
use crate::application::services::llm::{
    ArtifactPrompt, CharacterPrompt, CulturePrompt, EventPrompt, FactionPrompt, LocationPrompt,
    SeedPrompt,
};
use crate::domain::document::{CULTURE, PHYSICAL_WORLD, SOCIETAL_STRUCTURE_IDEA};
use crate::domain::entities::{
    ArtifactRecord, Aspect, CharacterRecord, EventRecord, FactionRecord, LocationRecord,
};
use crate::domain::value_objects::{EntityKind, StoragePath};

const MISSING_PHYSICAL_WORLD: &str =
    "Physical world data (World Seed) is missing. Please generate a world seed first.";
const MISSING_CULTURE: &str =
    "Cultural data is missing. Please generate the cultural tapestry first.";

pub type Descriptions = BTreeMap<String, String>;

impl WorldBuilder {
    fn require_section(&self, section: &str, message: &str) -> Result<(), WorldBuilderError> {
        if self.document.section_is_populated(section) {
            Ok(())
        } else {
            Err(WorldBuilderError::MissingWorldData(message.to_string()))
        }
    }

    /// Start a new world from `core_concept` and describe its physical world
    ///
    /// The whole document is discarded first. Stops at the first failing
    /// category.
    #[instrument(skip(self))]
    pub async fn generate_world_seed(
        &mut self,
        core_concept: &str,
    ) -> Result<Descriptions, WorldBuilderError> {
        info!("Generating world seed");
        self.document.reset_with_concept(core_concept);

        let inputs = SeedPrompt::new(core_concept);
        let generated = self
            .generate_family(
                &inputs,
                |aspect| StoragePath::section_field(PHYSICAL_WORLD, aspect.key()),
                OnFailure::Abort,
            )
            .await?;

        info!("World seed generation complete");
        Ok(generated)
    }

    /// Describe the culture of a society built on the existing physical world
    #[instrument(skip(self))]
    pub async fn generate_cultural_tapestry(
        &mut self,
        societal_structure_idea: &str,
    ) -> Result<Descriptions, WorldBuilderError> {
        self.require_section(PHYSICAL_WORLD, MISSING_PHYSICAL_WORLD)?;
        info!("Generating cultural tapestry");

        self.document
            .set_root_text(SOCIETAL_STRUCTURE_IDEA, societal_structure_idea);
        let inputs = CulturePrompt::new(&self.document, societal_structure_idea);
        let generated = self
            .generate_family(
                &inputs,
                |aspect| StoragePath::section_field(CULTURE, aspect.key()),
                OnFailure::Abort,
            )
            .await?;

        info!("Cultural tapestry generation complete");
        Ok(generated)
    }

    #[instrument(skip(self))]
    pub async fn generate_faction(
        &mut self,
        name: &str,
        faction_type: &str,
        goal: &str,
    ) -> Result<Descriptions, WorldBuilderError> {
        self.require_section(CULTURE, MISSING_CULTURE)?;
        info!("Generating faction");

        let inputs = FactionPrompt::new(&self.document, name, faction_type, goal);
        self.document.insert_entity(
            EntityKind::Faction,
            name,
            &FactionRecord::new(faction_type, goal),
        )?;

        let generated = self
            .generate_family(
                &inputs,
                |detail| StoragePath::entity_detail(EntityKind::Faction, name, detail.key()),
                OnFailure::Abort,
            )
            .await?;

        info!("Faction generation complete");
        Ok(generated)
    }

    /// Generate a character; failed details are skipped and the rest returned
    ///
    /// A `faction_name` that does not match an existing faction is dropped.
    #[instrument(skip(self))]
    pub async fn generate_character(
        &mut self,
        name: &str,
        role: &str,
        ethnicity: &str,
        faction_name: Option<&str>,
        quirk: Option<&str>,
    ) -> Result<Descriptions, WorldBuilderError> {
        self.require_section(CULTURE, MISSING_CULTURE)?;
        info!("Generating character");

        let faction = faction_name
            .map(str::trim)
            .filter(|faction| self.document.has_entity(EntityKind::Faction, faction));
        let quirk = quirk.unwrap_or_default();

        let inputs = CharacterPrompt::new(&self.document, name, role, ethnicity, faction, quirk);
        self.document.insert_entity(
            EntityKind::Character,
            name,
            &CharacterRecord::new(role, ethnicity, faction.map(str::to_string), quirk),
        )?;

        let generated = self
            .generate_family(
                &inputs,
                |detail| StoragePath::entity_detail(EntityKind::Character, name, detail.key()),
                OnFailure::Continue,
            )
            .await?;

        info!(generated = generated.len(), "Character generation finished");
        Ok(generated)
    }

    /// Generate a location; failed details are skipped and the rest returned
    #[instrument(skip(self))]
    pub async fn generate_location(
        &mut self,
        name: &str,
        location_type: &str,
        brief_description: &str,
    ) -> Result<Descriptions, WorldBuilderError> {
        info!("Generating location");

        let inputs = LocationPrompt::new(&self.document, name, location_type, brief_description);
        self.document.insert_entity(
            EntityKind::Location,
            name,
            &LocationRecord::new(location_type, brief_description),
        )?;

        let generated = self
            .generate_family(
                &inputs,
                |detail| StoragePath::entity_detail(EntityKind::Location, name, detail.key()),
                OnFailure::Continue,
            )
            .await?;

        info!(generated = generated.len(), "Location generation finished");
        Ok(generated)
    }

    /// Generate an artifact; failed details are skipped and the rest returned
    #[instrument(skip(self))]
    pub async fn generate_artifact(
        &mut self,
        name: &str,
        artifact_type: &str,
        origin: &str,
    ) -> Result<Descriptions, WorldBuilderError> {
        info!("Generating artifact");

        let inputs = ArtifactPrompt::new(&self.document, name, artifact_type, origin);
        self.document.insert_entity(
            EntityKind::Artifact,
            name,
            &ArtifactRecord::new(artifact_type, origin),
        )?;

        let generated = self
            .generate_family(
                &inputs,
                |detail| StoragePath::entity_detail(EntityKind::Artifact, name, detail.key()),
                OnFailure::Continue,
            )
            .await?;

        info!(generated = generated.len(), "Artifact generation finished");
        Ok(generated)
    }

    /// Generate an event; failed details are skipped and the rest returned
    #[instrument(skip(self))]
    pub async fn generate_event(
        &mut self,
        name: &str,
        event_type: &str,
        timeframe: &str,
    ) -> Result<Descriptions, WorldBuilderError> {
        info!("Generating event");

        let inputs = EventPrompt::new(&self.document, name, event_type, timeframe);
        self.document.insert_entity(
            EntityKind::Event,
            name,
            &EventRecord::new(event_type, timeframe),
        )?;

        let generated = self
            .generate_family(
                &inputs,
                |detail| StoragePath::entity_detail(EntityKind::Event, name, detail.key()),
                OnFailure::Continue,
            )
            .await?;

        info!(generated = generated.len(), "Event generation finished");
        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::ScriptedLlm;
    use super::*;
    use crate::application::ports::outbound::LlmError;
    use crate::domain::entities::{CultureAspect, LocationDetail, PhysicalAspect};

    async fn seeded_builder(text: &'static str) -> WorldBuilder {
        let mut builder = WorldBuilder::new(ScriptedLlm::fixed(text));
        builder.generate_world_seed("floating islands").await.unwrap();
        builder
            .generate_cultural_tapestry("clan federation")
            .await
            .unwrap();
        builder
    }

    #[tokio::test]
    async fn test_world_seed_generates_every_physical_aspect() {
        let mut builder = WorldBuilder::new(ScriptedLlm::fixed("Generated."));
        let generated = builder.generate_world_seed("floating islands").await.unwrap();

        assert_eq!(generated.len(), PhysicalAspect::ALL.len());
        for aspect in PhysicalAspect::ALL {
            assert_eq!(
                builder.document().section_text(PHYSICAL_WORLD, aspect.key()),
                Some("Generated.")
            );
        }
    }

    #[tokio::test]
    async fn test_world_seed_discards_previous_world() {
        let mut builder = seeded_builder("Generated.").await;
        builder
            .generate_faction("Iron Hand", "guild", "hoard sky-iron")
            .await
            .unwrap();

        builder.generate_world_seed("desert planet").await.unwrap();

        assert_eq!(builder.document().core_concept(), Some("desert planet"));
        assert!(builder.find_entity("Iron Hand").is_none());
        assert!(!builder.document().section_is_populated(CULTURE));
    }

    #[tokio::test]
    async fn test_failing_provider_aborts_seed_before_any_write() {
        let llm = ScriptedLlm::failing("Error: rate limited");
        let mut builder = WorldBuilder::new(llm.clone());

        let err = builder
            .generate_world_seed("floating islands")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorldBuilderError::LlmGeneration { ref category, .. } if category == "geography"
        ));
        assert!(err.to_string().contains("geography"));
        assert!(!builder.document().section_is_populated(PHYSICAL_WORLD));
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_seed_keeps_categories_written_before_failure() {
        let llm = ScriptedLlm::new(|index, _| {
            if index < 2 {
                Ok("Generated.".to_string())
            } else {
                Err(LlmError::Remote("quota exceeded".to_string()))
            }
        });
        let mut builder = WorldBuilder::new(llm.clone());

        let err = builder
            .generate_world_seed("floating islands")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorldBuilderError::LlmGeneration { ref category, .. } if category == "flora_fauna"
        ));
        let doc = builder.document();
        assert!(doc.section_text(PHYSICAL_WORLD, "geography").is_some());
        assert!(doc.section_text(PHYSICAL_WORLD, "climate").is_some());
        assert!(doc.section_text(PHYSICAL_WORLD, "flora_fauna").is_none());
        assert_eq!(llm.calls(), 3);
    }

    #[tokio::test]
    async fn test_culture_requires_world_seed() {
        let llm = ScriptedLlm::fixed("Generated.");
        let mut builder = WorldBuilder::new(llm.clone());

        let err = builder
            .generate_cultural_tapestry("clan federation")
            .await
            .unwrap_err();

        assert!(matches!(err, WorldBuilderError::MissingWorldData(_)));
        assert!(builder.document().is_empty());
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_culture_generates_every_aspect() {
        let builder = seeded_builder("Generated.").await;
        let doc = builder.document();

        for aspect in CultureAspect::ALL {
            assert!(doc.section_text(CULTURE, aspect.key()).is_some());
        }
        assert_eq!(
            doc.root_text(SOCIETAL_STRUCTURE_IDEA),
            Some("clan federation")
        );
    }

    #[tokio::test]
    async fn test_faction_requires_culture() {
        let mut builder = WorldBuilder::new(ScriptedLlm::fixed("Generated."));
        builder.generate_world_seed("floating islands").await.unwrap();

        let err = builder
            .generate_faction("Iron Hand", "guild", "hoard sky-iron")
            .await
            .unwrap_err();

        assert!(matches!(err, WorldBuilderError::MissingWorldData(_)));
        assert!(builder.document().section("factions").is_none());
    }

    #[tokio::test]
    async fn test_faction_stores_record_and_details() {
        let mut builder = seeded_builder("Generated.").await;
        let generated = builder
            .generate_faction("Iron Hand", "guild", "hoard sky-iron")
            .await
            .unwrap();

        assert_eq!(generated.len(), 8);
        let found = builder.find_entity("Iron Hand").unwrap();
        assert_eq!(found.kind, EntityKind::Faction);
        assert_eq!(found.record["type"], "guild");
        assert_eq!(found.record["goal"], "hoard sky-iron");
        assert_eq!(found.record["details"]["leadership"], "Generated.");
    }

    #[tokio::test]
    async fn test_character_drops_unknown_faction() {
        let mut builder = seeded_builder("Generated.").await;
        builder
            .generate_character("Aria", "pilot", "islander", Some("Nobody"), None)
            .await
            .unwrap();

        let found = builder.find_entity("Aria").unwrap();
        assert!(found.record["faction"].is_null());
        assert_eq!(found.record["quirk"], "");
    }

    #[tokio::test]
    async fn test_character_keeps_known_faction() {
        let mut builder = seeded_builder("Generated.").await;
        builder
            .generate_faction("Iron Hand", "guild", "hoard sky-iron")
            .await
            .unwrap();
        let generated = builder
            .generate_character(
                "Aria",
                "pilot",
                "islander",
                Some("Iron Hand"),
                Some("collects feathers"),
            )
            .await
            .unwrap();

        assert_eq!(generated.len(), 7);
        let found = builder.find_entity("Aria").unwrap();
        assert_eq!(found.record["faction"], "Iron Hand");
        assert_eq!(found.record["quirk"], "collects feathers");
    }

    #[tokio::test]
    async fn test_location_returns_every_detail() {
        let mut builder = WorldBuilder::new(ScriptedLlm::fixed("A windswept ledge."));
        let generated = builder
            .generate_location("Aerie Peak", "settlement", "cliffside outpost")
            .await
            .unwrap();

        let keys: Vec<&str> = generated.keys().map(String::as_str).collect();
        let mut expected: Vec<&str> = LocationDetail::ALL.iter().map(|d| d.key()).collect();
        expected.sort_unstable();
        assert_eq!(keys, expected);
        assert!(generated.values().all(|text| text == "A windswept ledge."));

        let found = builder.find_entity("Aerie Peak").unwrap();
        assert_eq!(found.record["type"], "settlement");
        assert_eq!(found.record["brief"], "cliffside outpost");
    }

    #[tokio::test]
    async fn test_partial_failure_continues_and_keeps_record() {
        let llm = ScriptedLlm::new(|index, _| {
            if index == 1 {
                Err(LlmError::Remote("timeout".to_string()))
            } else {
                Ok("Detail.".to_string())
            }
        });
        let mut builder = WorldBuilder::new(llm.clone());

        let generated = builder
            .generate_artifact("Storm Crown", "relic", "the first storm")
            .await
            .unwrap();

        assert_eq!(llm.calls(), 6);
        assert_eq!(generated.len(), 5);
        assert!(!generated.contains_key("history_legend"));

        let record = builder
            .document()
            .get(&StoragePath::entity(EntityKind::Artifact, "Storm Crown"))
            .unwrap();
        assert_eq!(record["origin"], "the first storm");
        assert!(record["details"].get("history_legend").is_none());
    }

    #[tokio::test]
    async fn test_event_with_failing_provider_keeps_empty_record() {
        let mut builder = WorldBuilder::new(ScriptedLlm::failing("service unavailable"));

        let generated = builder
            .generate_event("The Sundering", "cataclysm", "300 years ago")
            .await
            .unwrap();

        assert!(generated.is_empty());
        let record = builder
            .document()
            .get(&StoragePath::entity(EntityKind::Event, "The Sundering"))
            .unwrap();
        assert_eq!(record["timeframe"], "300 years ago");
        assert!(record["details"].as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_regenerating_entity_overwrites_record() {
        let mut builder = WorldBuilder::new(ScriptedLlm::fixed("Generated."));
        builder
            .generate_location("Aerie Peak", "settlement", "cliffside outpost")
            .await
            .unwrap();
        builder
            .generate_location("Aerie Peak", "ruin", "abandoned")
            .await
            .unwrap();

        let found = builder.find_entity("Aerie Peak").unwrap();
        assert_eq!(found.record["type"], "ruin");
        assert_eq!(found.record["brief"], "abandoned");
    }
}
