//! Prompt composer - builds category prompts from templates and world context
//!
//! Each generation family has a named-field input record. Pairing a family's
//! aspect enum with its input record through [`PromptInputs`] means a typed call
//! to [`compose`] always supplies every field its template references.
//! [`compose_raw`] is the string-keyed entry point used for previews; it never
//! fails and falls back to a generic prompt instead.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use super::templates::{self, Rendered};
use crate::domain::document::{WorldDocument, CORE_CONCEPT, CULTURE, PHYSICAL_WORLD};
use crate::domain::entities::{
    ArtifactDetail, Aspect, CharacterDetail, CultureAspect, EventDetail, FactionDetail,
    LocationDetail, PhysicalAspect,
};
use crate::domain::value_objects::{EntityKind, StoragePath, DETAILS_KEY};

pub const SUMMARY_SNIPPET_CHARS: usize = 100;
pub const SUMMARY_MAX_CHARS: usize = 500;

const NOT_SPECIFIED: &str = "Not specified";
const EMPTY_WORLD_CONTEXT: &str = "No world context has been established yet.";

/// Named inputs for one generation family
pub trait PromptInputs {
    type Aspect: Aspect;

    fn fields(&self) -> BTreeMap<String, String>;
}

/// Build the prompt for one typed category
pub fn compose<I: PromptInputs>(document: &WorldDocument, aspect: I::Aspect, inputs: &I) -> String {
    compose_raw(document, aspect.category(), &inputs.fields())
}

/// Build the prompt for `category` from loosely supplied fields
///
/// Unknown categories get a generic prompt; a template referencing a field that
/// was not supplied gets an error-describing prompt. Neither case fails.
pub fn compose_raw(
    document: &WorldDocument,
    category: &str,
    fields: &BTreeMap<String, String>,
) -> String {
    let summary = world_context_summary(document);
    let world_context = if summary.is_empty() {
        EMPTY_WORLD_CONTEXT.to_string()
    } else {
        summary
    };

    let Some(template) = templates::template_for(category) else {
        warn!(category, "Unknown prompt category requested, using generic prompt");
        return format!(
            "Generate detailed information about '{}' concerning '{}'. \
             Consider the overall world context: {}",
            category.replace('_', " "),
            joined_values(fields),
            world_context
        );
    };

    let shared = templates::shared_fields();
    let rendered = templates::render(template, |name| {
        if name == "world_context" {
            return Some(world_context.as_str());
        }
        fields
            .get(name)
            .map(String::as_str)
            .or_else(|| shared.iter().find(|(k, _)| *k == name).map(|(_, v)| *v))
    });

    match rendered {
        Rendered::Complete(prompt) => prompt,
        Rendered::MissingFields(missing) => {
            warn!(
                category,
                missing = %missing.join(", "),
                "Prompt fields missing, using fallback prompt"
            );
            format!(
                "Error creating prompt '{}': missing fields {}. Base info: '{}'. World context: {}",
                category,
                missing.join(", "),
                joined_values(fields),
                world_context
            )
        }
    }
}

fn joined_values(fields: &BTreeMap<String, String>) -> String {
    fields.values().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Short digest of the established world, at most [`SUMMARY_MAX_CHARS`] characters
///
/// Absent fields are skipped, each snippet is cut to [`SUMMARY_SNIPPET_CHARS`].
pub fn world_context_summary(document: &WorldDocument) -> String {
    let entries: [(&str, Option<&str>); 6] = [
        ("World Core Concept", document.core_concept()),
        ("Key Geography", document.section_text(PHYSICAL_WORLD, "geography")),
        ("Climate", document.section_text(PHYSICAL_WORLD, "climate")),
        ("History Snippet", document.section_text(PHYSICAL_WORLD, "history")),
        ("Dominant Culture", document.section_text(CULTURE, "social_structure")),
        ("Governance", document.section_text(CULTURE, "governance")),
    ];

    let summary = entries
        .iter()
        .filter_map(|(label, text)| {
            text.map(|t| format!("{}: {}.", label, truncate(t.trim(), SUMMARY_SNIPPET_CHARS)))
        })
        .collect::<Vec<_>>()
        .join(" ");

    truncate(&summary, SUMMARY_MAX_CHARS)
}

/// Cut `text` to at most `max` characters, marking the cut with "..."
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn text_or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.unwrap_or(fallback)
}

fn names_or_none<I: IntoIterator<Item = String>>(names: I) -> String {
    let names: Vec<String> = names.into_iter().collect();
    if names.is_empty() {
        "none yet".to_string()
    } else {
        names.join(", ")
    }
}

fn other_entity_names(document: &WorldDocument, kind: EntityKind, exclude: &str) -> Vec<String> {
    document
        .section(kind.section_key())
        .map(|section| {
            section
                .keys()
                .filter(|name| name.as_str() != exclude)
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

// =============================================================================
// World seed
// =============================================================================

#[derive(Debug, Clone)]
pub struct SeedPrompt {
    pub core_concept: String,
}

impl SeedPrompt {
    pub fn new(core_concept: impl Into<String>) -> Self {
        Self {
            core_concept: core_concept.into(),
        }
    }
}

impl PromptInputs for SeedPrompt {
    type Aspect = PhysicalAspect;

    fn fields(&self) -> BTreeMap<String, String> {
        BTreeMap::from([("core_concept".to_string(), self.core_concept.clone())])
    }
}

// =============================================================================
// Cultural tapestry
// =============================================================================

#[derive(Debug, Clone)]
pub struct CulturePrompt {
    pub societal_structure: String,
    pub physical_context: String,
    pub core_concept: String,
}

impl CulturePrompt {
    pub fn new(document: &WorldDocument, societal_structure: impl Into<String>) -> Self {
        let physical =
            |field: &str| text_or(document.section_text(PHYSICAL_WORLD, field), NOT_SPECIFIED);
        Self {
            societal_structure: societal_structure.into(),
            physical_context: format!(
                "Geography: {}\nClimate: {}\nResources: {}",
                physical("geography"),
                physical("climate"),
                physical("resources")
            ),
            core_concept: text_or(document.root_text(CORE_CONCEPT), "this world").to_string(),
        }
    }
}

impl PromptInputs for CulturePrompt {
    type Aspect = CultureAspect;

    fn fields(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("societal_structure".to_string(), self.societal_structure.clone()),
            ("physical_context".to_string(), self.physical_context.clone()),
            ("core_concept".to_string(), self.core_concept.clone()),
        ])
    }
}

// =============================================================================
// Faction
// =============================================================================

#[derive(Debug, Clone)]
pub struct FactionPrompt {
    pub name: String,
    pub faction_type: String,
    pub goal: String,
    pub cultural_context: String,
    pub physical_context: String,
    pub existing_factions: String,
}

impl FactionPrompt {
    pub fn new(document: &WorldDocument, name: &str, faction_type: &str, goal: &str) -> Self {
        let culture = |field: &str| text_or(document.section_text(CULTURE, field), NOT_SPECIFIED);
        let physical =
            |field: &str| text_or(document.section_text(PHYSICAL_WORLD, field), NOT_SPECIFIED);
        Self {
            name: name.to_string(),
            faction_type: faction_type.to_string(),
            goal: goal.to_string(),
            cultural_context: format!(
                "Social Structure: {}\nGovernance: {}\nEconomy: {}\nMain Religion/Beliefs: {}",
                culture("social_structure"),
                culture("governance"),
                culture("economy"),
                culture("religions")
            ),
            physical_context: format!(
                "Key Resources: {}\nHistorical Context: {}",
                physical("resources"),
                physical("history")
            ),
            existing_factions: names_or_none(other_entity_names(
                document,
                EntityKind::Faction,
                name,
            )),
        }
    }
}

impl PromptInputs for FactionPrompt {
    type Aspect = FactionDetail;

    fn fields(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("name".to_string(), self.name.clone()),
            ("faction_type".to_string(), self.faction_type.clone()),
            ("goal".to_string(), self.goal.clone()),
            ("cultural_context".to_string(), self.cultural_context.clone()),
            ("physical_context".to_string(), self.physical_context.clone()),
            ("existing_factions".to_string(), self.existing_factions.clone()),
        ])
    }
}

// =============================================================================
// Character
// =============================================================================

#[derive(Debug, Clone)]
pub struct CharacterPrompt {
    pub name: String,
    pub role: String,
    pub ethnicity: String,
    pub physical_context: String,
    pub cultural_context: String,
    pub faction_context: String,
    pub quirk: String,
    pub existing_characters: String,
}

impl CharacterPrompt {
    /// `faction` must already be resolved against the document; an unknown
    /// faction is passed as `None`.
    pub fn new(
        document: &WorldDocument,
        name: &str,
        role: &str,
        ethnicity: &str,
        faction: Option<&str>,
        quirk: &str,
    ) -> Self {
        let culture = |field: &str, fallback: &'static str| {
            text_or(document.section_text(CULTURE, field), fallback)
        };
        let physical =
            |field: &str| text_or(document.section_text(PHYSICAL_WORLD, field), "Varied.");

        let faction_context = faction
            .and_then(|faction_name| {
                document
                    .get(&StoragePath::entity(EntityKind::Faction, faction_name))
                    .map(|record| (faction_name, record))
            })
            .map(|(faction_name, record)| {
                let field = |key: &str| {
                    record
                        .get(key)
                        .and_then(Value::as_str)
                        .unwrap_or(NOT_SPECIFIED)
                        .to_string()
                };
                let values = record
                    .get(DETAILS_KEY)
                    .and_then(|details| details.get("values_ideology"))
                    .and_then(Value::as_str)
                    .unwrap_or("Not specified.");
                format!(
                    "affiliated faction '{}': Type - {}, Goal - {}, Values - {}",
                    faction_name,
                    field("type"),
                    field("goal"),
                    values
                )
            })
            .unwrap_or_else(|| "lack of any faction affiliation".to_string());

        Self {
            name: name.to_string(),
            role: role.to_string(),
            ethnicity: ethnicity.to_string(),
            physical_context: format!(
                "Environment: {} Climate: {}",
                physical("geography"),
                physical("climate")
            ),
            cultural_context: format!(
                "Culture ({}): {} Traditions: {} Language hints: {}",
                ethnicity,
                culture("customs", "General customs apply."),
                culture("traditions", "General traditions apply."),
                culture("language", "Common tongue assumed.")
            ),
            faction_context,
            quirk: if quirk.trim().is_empty() {
                "None".to_string()
            } else {
                quirk.to_string()
            },
            existing_characters: names_or_none(other_entity_names(
                document,
                EntityKind::Character,
                name,
            )),
        }
    }
}

impl PromptInputs for CharacterPrompt {
    type Aspect = CharacterDetail;

    fn fields(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("name".to_string(), self.name.clone()),
            ("role".to_string(), self.role.clone()),
            ("ethnicity".to_string(), self.ethnicity.clone()),
            ("physical_context".to_string(), self.physical_context.clone()),
            ("cultural_context".to_string(), self.cultural_context.clone()),
            ("faction_context".to_string(), self.faction_context.clone()),
            ("quirk".to_string(), self.quirk.clone()),
            ("existing_characters".to_string(), self.existing_characters.clone()),
        ])
    }
}

// =============================================================================
// Location
// =============================================================================

#[derive(Debug, Clone)]
pub struct LocationPrompt {
    pub name: String,
    pub location_type: String,
    pub brief: String,
    pub physical_context: String,
    pub historical_context: String,
    pub cultural_context: String,
}

impl LocationPrompt {
    pub fn new(document: &WorldDocument, name: &str, location_type: &str, brief: &str) -> Self {
        let culture = |field: &str| text_or(document.section_text(CULTURE, field), NOT_SPECIFIED);
        let physical =
            |field: &str| text_or(document.section_text(PHYSICAL_WORLD, field), NOT_SPECIFIED);
        Self {
            name: name.to_string(),
            location_type: location_type.to_string(),
            brief: brief.to_string(),
            physical_context: format!(
                "General Geography: {}\nGeneral Climate: {}",
                physical("geography"),
                physical("climate")
            ),
            historical_context: format!("World History Overview: {}", physical("history")),
            cultural_context: format!(
                "Dominant Culture(s): {} Governance Style: {}",
                culture("social_structure"),
                culture("governance")
            ),
        }
    }
}

impl PromptInputs for LocationPrompt {
    type Aspect = LocationDetail;

    fn fields(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("name".to_string(), self.name.clone()),
            ("location_type".to_string(), self.location_type.clone()),
            ("brief".to_string(), self.brief.clone()),
            ("physical_context".to_string(), self.physical_context.clone()),
            ("historical_context".to_string(), self.historical_context.clone()),
            ("cultural_context".to_string(), self.cultural_context.clone()),
        ])
    }
}

// =============================================================================
// Artifact
// =============================================================================

#[derive(Debug, Clone)]
pub struct ArtifactPrompt {
    pub name: String,
    pub artifact_type: String,
    pub origin: String,
    pub historical_context: String,
    pub cultural_context: String,
}

impl ArtifactPrompt {
    pub fn new(document: &WorldDocument, name: &str, artifact_type: &str, origin: &str) -> Self {
        Self {
            name: name.to_string(),
            artifact_type: artifact_type.to_string(),
            origin: origin.to_string(),
            historical_context: format!(
                "World History Overview: {}",
                text_or(document.section_text(PHYSICAL_WORLD, "history"), NOT_SPECIFIED)
            ),
            cultural_context: format!(
                "Relevant Cultures: {}",
                text_or(
                    document.section_text(CULTURE, "religions"),
                    "Various beliefs exist."
                )
            ),
        }
    }
}

impl PromptInputs for ArtifactPrompt {
    type Aspect = ArtifactDetail;

    fn fields(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("name".to_string(), self.name.clone()),
            ("artifact_type".to_string(), self.artifact_type.clone()),
            ("origin".to_string(), self.origin.clone()),
            ("historical_context".to_string(), self.historical_context.clone()),
            ("cultural_context".to_string(), self.cultural_context.clone()),
        ])
    }
}

// =============================================================================
// Event
// =============================================================================

#[derive(Debug, Clone)]
pub struct EventPrompt {
    pub name: String,
    pub event_type: String,
    pub timeframe: String,
    pub historical_context: String,
    pub faction_context: String,
    pub character_context: String,
}

impl EventPrompt {
    pub fn new(document: &WorldDocument, name: &str, event_type: &str, timeframe: &str) -> Self {
        let factions = document
            .section(EntityKind::Faction.section_key())
            .map(|section| section.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        let roles = document
            .section(EntityKind::Character.section_key())
            .map(|section| {
                section
                    .values()
                    .filter_map(|record| record.get("role").and_then(Value::as_str))
                    .filter(|role| !role.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Self {
            name: name.to_string(),
            event_type: event_type.to_string(),
            timeframe: timeframe.to_string(),
            historical_context: format!(
                "World History Overview: {}",
                text_or(document.section_text(PHYSICAL_WORLD, "history"), NOT_SPECIFIED)
            ),
            faction_context: format!("Existing Factions: {}", names_or_none(factions)),
            character_context: format!("Notable Character Roles: {}", names_or_none(roles)),
        }
    }
}

impl PromptInputs for EventPrompt {
    type Aspect = EventDetail;

    fn fields(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("name".to_string(), self.name.clone()),
            ("event_type".to_string(), self.event_type.clone()),
            ("timeframe".to_string(), self.timeframe.clone()),
            ("historical_context".to_string(), self.historical_context.clone()),
            ("faction_context".to_string(), self.faction_context.clone()),
            ("character_context".to_string(), self.character_context.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::FactionRecord;
    use serde_json::json;

    fn world() -> WorldDocument {
        let mut doc = WorldDocument::new();
        doc.reset_with_concept("floating islands");
        for (field, text) in [
            ("geography", "Islands drift above an endless sea of cloud."),
            ("climate", "Cold winds, sudden storms."),
            ("history", "The Sundering split the continent."),
        ] {
            doc.set(&StoragePath::section_field(PHYSICAL_WORLD, field), json!(text));
        }
        for (field, text) in [
            ("social_structure", "Clans bound by sky-oaths."),
            ("governance", "A rotating council."),
            ("customs", "Wind-bell greetings."),
        ] {
            doc.set(&StoragePath::section_field(CULTURE, field), json!(text));
        }
        doc
    }

    fn assert_complete(prompt: &str) {
        assert!(!prompt.contains("{{"), "leftover placeholder in: {prompt}");
        assert!(!prompt.starts_with("Error creating prompt"), "{prompt}");
    }

    #[test]
    fn test_every_typed_template_renders() {
        let doc = world();

        let seed = SeedPrompt::new("floating islands");
        for aspect in PhysicalAspect::ALL {
            assert_complete(&compose(&doc, *aspect, &seed));
        }
        let culture = CulturePrompt::new(&doc, "clan federation");
        for aspect in CultureAspect::ALL {
            assert_complete(&compose(&doc, *aspect, &culture));
        }
        let faction = FactionPrompt::new(&doc, "Iron Hand", "guild", "hoard sky-iron");
        for detail in FactionDetail::ALL {
            assert_complete(&compose(&doc, *detail, &faction));
        }
        let character = CharacterPrompt::new(&doc, "Aria", "pilot", "islander", None, "");
        for detail in CharacterDetail::ALL {
            assert_complete(&compose(&doc, *detail, &character));
        }
        let location = LocationPrompt::new(&doc, "Aerie Peak", "settlement", "cliffside outpost");
        for detail in LocationDetail::ALL {
            assert_complete(&compose(&doc, *detail, &location));
        }
        let artifact = ArtifactPrompt::new(&doc, "Storm Crown", "relic", "the first storm");
        for detail in ArtifactDetail::ALL {
            assert_complete(&compose(&doc, *detail, &artifact));
        }
        let event = EventPrompt::new(&doc, "The Sundering", "cataclysm", "300 years ago");
        for detail in EventDetail::ALL {
            assert_complete(&compose(&doc, *detail, &event));
        }
    }

    #[test]
    fn test_backstory_embeds_faction_culture_and_quirk() {
        let mut doc = world();
        doc.insert_entity(
            EntityKind::Faction,
            "Iron Hand",
            &FactionRecord::new("guild", "hoard sky-iron"),
        )
        .unwrap();
        doc.set(
            &StoragePath::entity_detail(EntityKind::Faction, "Iron Hand", "values_ideology"),
            json!("Profit above all."),
        );

        let inputs = CharacterPrompt::new(
            &doc,
            "Aria",
            "pilot",
            "islander",
            Some("Iron Hand"),
            "collects feathers",
        );
        let prompt = compose(&doc, CharacterDetail::Backstory, &inputs);

        assert!(prompt.contains("affiliated faction 'Iron Hand'"));
        assert!(prompt.contains("Goal - hoard sky-iron"));
        assert!(prompt.contains("Values - Profit above all."));
        assert!(prompt.contains("Wind-bell greetings."));
        assert!(prompt.contains("collects feathers"));
    }

    #[test]
    fn test_unknown_category_falls_back() {
        let doc = world();
        let fields = BTreeMap::from([("name".to_string(), "Aria".to_string())]);
        let prompt = compose_raw(&doc, "ship_designs", &fields);

        assert!(prompt.starts_with("Generate detailed information about 'ship designs'"));
        assert!(prompt.contains("'Aria'"));
        assert!(prompt.contains("World Core Concept: floating islands."));
    }

    #[test]
    fn test_missing_field_falls_back() {
        let doc = world();
        let fields = BTreeMap::from([("name".to_string(), "Aria".to_string())]);
        let prompt = compose_raw(&doc, "character_backstory", &fields);

        assert!(prompt.starts_with("Error creating prompt 'character_backstory'"));
        assert!(prompt.contains("role"));
        assert!(prompt.contains("quirk"));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let doc = world();
        let inputs = LocationPrompt::new(&doc, "Aerie Peak", "settlement", "cliffside outpost");
        assert_eq!(
            compose(&doc, LocationDetail::History, &inputs),
            compose(&doc, LocationDetail::History, &inputs)
        );
    }

    #[test]
    fn test_summary_skips_absent_fields() {
        let mut doc = WorldDocument::new();
        assert_eq!(world_context_summary(&doc), "");

        doc.reset_with_concept("desert planet");
        assert_eq!(
            world_context_summary(&doc),
            "World Core Concept: desert planet."
        );

        let summary = world_context_summary(&world());
        assert!(summary.contains("Key Geography: Islands drift"));
        assert!(summary.contains("Governance: A rotating council."));
        assert!(!summary.contains("Flora"));
    }

    #[test]
    fn test_summary_is_bounded() {
        let mut doc = WorldDocument::new();
        doc.reset_with_concept(&"é".repeat(400));
        for field in ["geography", "climate", "history"] {
            doc.set(
                &StoragePath::section_field(PHYSICAL_WORLD, field),
                json!("x".repeat(300)),
            );
        }
        for field in ["social_structure", "governance"] {
            doc.set(&StoragePath::section_field(CULTURE, field), json!("y".repeat(300)));
        }

        let summary = world_context_summary(&doc);
        assert_eq!(summary.chars().count(), SUMMARY_MAX_CHARS);
        assert!(summary.ends_with("..."));
        assert!(summary.starts_with(&format!("World Core Concept: {}...", "é".repeat(97))));
    }

    #[test]
    fn test_truncate_only_marks_cut_text() {
        assert_eq!(truncate("short", 100), "short");
        assert_eq!(truncate("abcdef", 5), "ab...");
    }
}
