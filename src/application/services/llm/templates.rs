//! Prompt templates keyed by category name
//!
//! Placeholders use `{{field}}` syntax. Every template may reference the shared
//! `{{world_context}}` slot; the remaining fields are supplied by the input
//! record of the template's family.

const EXPERT: &str = "You are a fantasy world-building expert.";

/// `(category, template)` pairs for every generation category
pub const TEMPLATES: &[(&str, &str)] = &[
    // World seed: core_concept
    (
        "geography",
        "{{expert}} Based on the core concept '{{core_concept}}', describe the world's geography: \
         continents or landmasses, major mountain ranges, rivers, seas and any unusual terrain. \
         Keep it vivid and internally consistent.",
    ),
    (
        "climate",
        "{{expert}} For a world based on '{{core_concept}}', describe its climate patterns, \
         seasons, extreme weather and how climate varies between regions.",
    ),
    (
        "flora_fauna",
        "{{expert}} Invent unique flora and fauna for a world based on '{{core_concept}}'. \
         Describe several plants and creatures, their habitats and how they fit the world.",
    ),
    (
        "resources",
        "{{expert}} Describe the key natural resources found in a world based on \
         '{{core_concept}}', where they occur and why they are valuable or contested.",
    ),
    (
        "history",
        "{{expert}} Create a concise history outline for a world based on '{{core_concept}}', \
         covering its origins, defining eras and the events that shaped the present day.",
    ),
    // Cultural tapestry: societal_structure, physical_context, core_concept
    (
        "social_structure",
        "{{expert}} Detail the social structure of a '{{societal_structure}}' society within the \
         world context '{{core_concept}}'. Physical Context: {{physical_context}}. Describe classes, \
         mobility between them and family organisation.",
    ),
    (
        "governance",
        "{{expert}} Describe the governance of a '{{societal_structure}}' society within the world \
         context '{{core_concept}}'. Physical Context: {{physical_context}}. Explain who rules, how \
         power is gained and how laws are made and enforced.",
    ),
    (
        "economy",
        "{{expert}} Describe the economy of a '{{societal_structure}}' society within the world \
         context '{{core_concept}}'. Physical Context: {{physical_context}}. Explain trade, currency \
         and the main sources of wealth.",
    ),
    (
        "customs",
        "{{expert}} Describe the daily customs and etiquette of a '{{societal_structure}}' society \
         within the world context '{{core_concept}}'. Physical Context: {{physical_context}}. \
         Include greetings, meals and taboos.",
    ),
    (
        "traditions",
        "{{expert}} Detail the significant traditions, festivals and rites of passage of a \
         '{{societal_structure}}' society within the world context '{{core_concept}}'. \
         Physical Context: {{physical_context}}.",
    ),
    (
        "religions",
        "{{expert}} Describe the primary religious beliefs and practices of a \
         '{{societal_structure}}' society within the world context '{{core_concept}}'. \
         Physical Context: {{physical_context}}. Detail deities, clergy and sacred places.",
    ),
    (
        "language",
        "{{expert}} Create key aspects of the language(s) of a '{{societal_structure}}' society \
         within the world context '{{core_concept}}'. Physical Context: {{physical_context}}. \
         Suggest naming conventions, common phrases and writing systems.",
    ),
    (
        "art",
        "{{expert}} Describe the prominent artistic expressions of a '{{societal_structure}}' \
         society within the world context '{{core_concept}}'. Physical Context: \
         {{physical_context}}. Detail music, craft, architecture and storytelling.",
    ),
    (
        "technology",
        "{{expert}} Describe the general technology level of a '{{societal_structure}}' society \
         within the world context '{{core_concept}}'. Physical Context: {{physical_context}}. \
         Consider tools, transport, medicine and any magic that substitutes for technology.",
    ),
    // Faction: name, faction_type, goal, cultural_context, physical_context, existing_factions
    (
        "faction_description",
        "{{expert}} Describe the faction '{{name}}', a '{{faction_type}}' group whose main goal is \
         '{{goal}}'. Cover its public image, size and reputation. Cultural Context: \
         {{cultural_context}}. {{world_context}}",
    ),
    (
        "faction_organization",
        "{{expert}} Detail the internal organization and hierarchy of the faction '{{name}}' \
         (a '{{faction_type}}' aiming for '{{goal}}'). Explain ranks, recruitment and how orders \
         flow. Cultural Context: {{cultural_context}}. {{world_context}}",
    ),
    (
        "faction_leadership",
        "{{expert}} Describe the leadership of the faction '{{name}}' (a '{{faction_type}}' aiming \
         for '{{goal}}'). Name the key leaders and explain how they hold power. Cultural Context: \
         {{cultural_context}}. {{world_context}}",
    ),
    (
        "faction_values",
        "{{expert}} Explain the core values and ideology of the faction '{{name}}' (a \
         '{{faction_type}}' aiming for '{{goal}}'). Cultural Context: {{cultural_context}}. \
         {{world_context}}",
    ),
    (
        "faction_activities",
        "{{expert}} Describe the typical activities and methods of the faction '{{name}}' (a \
         '{{faction_type}}' aiming for '{{goal}}'). Cultural Context: {{cultural_context}}. \
         {{world_context}}",
    ),
    (
        "faction_relationships",
        "{{expert}} Detail the relationships of the faction '{{name}}' (a '{{faction_type}}' \
         aiming for '{{goal}}') with other groups, rivals and allies. Consider other factions: \
         {{existing_factions}}. {{world_context}}",
    ),
    (
        "faction_resources",
        "{{expert}} Describe the resources, wealth and assets available to the faction \
         '{{name}}' (a '{{faction_type}}' aiming for '{{goal}}'). Physical/Resource Context: \
         {{physical_context}}. {{world_context}}",
    ),
    (
        "faction_history",
        "{{expert}} Outline the history and origin of the faction '{{name}}' (a \
         '{{faction_type}}' aiming for '{{goal}}'). Historical Context: {{physical_context}}. \
         {{world_context}}",
    ),
    // Character: name, role, ethnicity, physical_context, cultural_context, faction_context,
    // quirk, existing_characters
    (
        "character_appearance",
        "{{expert}} Describe the physical appearance of '{{name}}', a '{{ethnicity}}' \
         '{{role}}'. Consider their environment: {{physical_context}}. Quirk Influence: \
         {{quirk}}. {{world_context}}",
    ),
    (
        "character_personality",
        "{{expert}} Describe the personality of '{{name}}', a '{{ethnicity}}' '{{role}}'. \
         Consider their culture: {{cultural_context}}. Quirk Influence: {{quirk}}. \
         {{world_context}}",
    ),
    (
        "character_backstory",
        "{{expert}} Create a compelling backstory for '{{name}}', a '{{ethnicity}}' '{{role}}'. \
         Consider their {{faction_context}} and their culture: {{cultural_context}}. Quirk \
         Origin/Influence: {{quirk}}. {{world_context}}",
    ),
    (
        "character_skills",
        "{{expert}} Detail the skills and abilities of '{{name}}', a '{{ethnicity}}' \
         '{{role}}'. Consider their {{faction_context}}. Quirk Influence: {{quirk}}. \
         {{world_context}}",
    ),
    (
        "character_relationships",
        "{{expert}} Describe the key relationships of '{{name}}', a '{{ethnicity}}' \
         '{{role}}'. Consider their {{faction_context}} and existing characters: \
         {{existing_characters}}. {{world_context}}",
    ),
    (
        "character_aspirations",
        "{{expert}} Detail the aspirations and motivations of '{{name}}', a '{{ethnicity}}' \
         '{{role}}'. Consider their {{faction_context}}. Quirk Influence: {{quirk}}. \
         {{world_context}}",
    ),
    (
        "character_possessions",
        "{{expert}} Describe the significant possessions and equipment of '{{name}}', a \
         '{{ethnicity}}' '{{role}}'. Consider their culture: {{cultural_context}}. \
         {{world_context}}",
    ),
    // Location: name, location_type, brief, physical_context, historical_context,
    // cultural_context
    (
        "location_description",
        "{{expert}} Provide a detailed sensory description of '{{name}}', a '{{location_type}}' \
         described as: '{{brief}}'. Physical Context: {{physical_context}}. {{world_context}}",
    ),
    (
        "location_history",
        "{{expert}} Outline the history of '{{name}}', a '{{location_type}}' ({{brief}}). \
         Historical Context: {{historical_context}}. {{world_context}}",
    ),
    (
        "location_inhabitants",
        "{{expert}} Describe the typical inhabitants and demographics of '{{name}}', a \
         '{{location_type}}' ({{brief}}). Cultural Context: {{cultural_context}}. \
         {{world_context}}",
    ),
    (
        "location_poi",
        "{{expert}} Detail 3-5 specific points of interest within '{{name}}', a \
         '{{location_type}}' ({{brief}}).",
    ),
    (
        "location_economy",
        "{{expert}} Describe the local economy and trade within '{{name}}', a \
         '{{location_type}}' ({{brief}}). Cultural Context: {{cultural_context}}. \
         {{world_context}}",
    ),
    (
        "location_governance",
        "{{expert}} Explain the local governance and law within '{{name}}', a \
         '{{location_type}}' ({{brief}}). Cultural Context: {{cultural_context}}. \
         {{world_context}}",
    ),
    (
        "location_culture",
        "{{expert}} Describe the unique local culture and customs in '{{name}}', a \
         '{{location_type}}' ({{brief}}). Cultural Context: {{cultural_context}}. \
         {{world_context}}",
    ),
    (
        "location_secrets",
        "{{expert}} Invent some secrets, rumors and hidden dangers associated with '{{name}}', a \
         '{{location_type}}' ({{brief}}).",
    ),
    // Artifact: name, artifact_type, origin, historical_context, cultural_context
    (
        "artifact_description",
        "{{expert}} Describe the appearance of '{{name}}', a '{{artifact_type}}' artifact \
         supposedly originating from '{{origin}}'. {{world_context}}",
    ),
    (
        "artifact_history",
        "{{expert}} Detail the known history and legends surrounding '{{name}}', a \
         '{{artifact_type}}' from '{{origin}}'. Historical Context: {{historical_context}}. \
         {{world_context}}",
    ),
    (
        "artifact_powers",
        "{{expert}} Describe the powers, abilities and limitations of '{{name}}', a \
         '{{artifact_type}}' from '{{origin}}'.",
    ),
    (
        "artifact_creation",
        "{{expert}} Elaborate on the creation of '{{name}}', a '{{artifact_type}}' from \
         '{{origin}}': who made it, how and why.",
    ),
    (
        "artifact_status",
        "{{expert}} Describe the current status and whereabouts of '{{name}}', a \
         '{{artifact_type}}' from '{{origin}}'.",
    ),
    (
        "artifact_significance",
        "{{expert}} Explain the cultural and religious significance of '{{name}}', a \
         '{{artifact_type}}' from '{{origin}}'. Cultural Context: {{cultural_context}}. \
         {{world_context}}",
    ),
    // Event: name, event_type, timeframe, historical_context, faction_context,
    // character_context
    (
        "event_description",
        "You are a fantasy world-building historian. Provide a concise summary description of \
         '{{name}}', a '{{event_type}}' event that occurred roughly '{{timeframe}}'. \
         {{world_context}}",
    ),
    (
        "event_causes",
        "You are a fantasy world-building historian. Detail the primary causes and triggers \
         leading up to '{{name}}', a '{{event_type}}' ({{timeframe}}). Historical Context: \
         {{historical_context}}. {{world_context}}",
    ),
    (
        "event_happenings",
        "You are a fantasy world-building historian. Describe the major happenings during \
         '{{name}}', a '{{event_type}}' ({{timeframe}}).",
    ),
    (
        "event_figures",
        "You are a fantasy world-building historian. Identify the key figures and groups \
         involved in '{{name}}', a '{{event_type}}' ({{timeframe}}). Context: \
         {{faction_context}}, {{character_context}}. {{world_context}}",
    ),
    (
        "event_impact",
        "You are a fantasy world-building historian. Describe the immediate outcome and impact \
         of '{{name}}', a '{{event_type}}' ({{timeframe}}). Historical Context: \
         {{historical_context}}. {{world_context}}",
    ),
    (
        "event_consequences",
        "You are a fantasy world-building historian. Explain the long-term consequences of \
         '{{name}}', a '{{event_type}}' ({{timeframe}}). Historical Context: \
         {{historical_context}}. {{world_context}}",
    ),
];

pub fn template_for(category: &str) -> Option<&'static str> {
    TEMPLATES
        .iter()
        .find(|(key, _)| *key == category)
        .map(|(_, template)| *template)
}

/// Fields filled in for every template regardless of family
pub fn shared_fields() -> [(&'static str, &'static str); 1] {
    [("expert", EXPERT)]
}

/// Result of rendering a template against a set of fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Complete(String),
    /// The template referenced fields that were not supplied
    MissingFields(Vec<String>),
}

/// Replace `{{field}}` placeholders with values from `lookup`
///
/// Every placeholder is resolved before anything is returned, so a single missing
/// field yields [`Rendered::MissingFields`] listing all of them.
pub fn render<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> Rendered {
    let mut result = String::with_capacity(template.len() * 2);
    let mut missing = Vec::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '{' && chars.peek() == Some(&'{') {
            chars.next();

            let mut var_name = String::new();
            let mut closed = false;
            while let Some(ch) = chars.next() {
                if ch == '}' && chars.peek() == Some(&'}') {
                    chars.next();
                    closed = true;
                    break;
                }
                var_name.push(ch);
            }

            if !closed {
                // Malformed, emit what we have
                result.push_str("{{");
                result.push_str(&var_name);
                break;
            }

            let var_name = var_name.trim();
            match lookup(var_name) {
                Some(value) => result.push_str(value),
                None => {
                    if !missing.iter().any(|m| m == var_name) {
                        missing.push(var_name.to_string());
                    }
                }
            }
        } else {
            result.push(c);
        }
    }

    if missing.is_empty() {
        Rendered::Complete(result)
    } else {
        Rendered::MissingFields(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_render_substitutes_fields() {
        let vars: HashMap<&str, &str> = [("name", "Aria"), ("role", "pilot")].into();
        let rendered = render("{{ name }} the {{role}}", |k| vars.get(k).copied());
        assert_eq!(rendered, Rendered::Complete("Aria the pilot".to_string()));
    }

    #[test]
    fn test_render_reports_every_missing_field_once() {
        let rendered = render("{{a}} {{b}} {{a}}", |_| None);
        assert_eq!(
            rendered,
            Rendered::MissingFields(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_render_leaves_single_braces_alone() {
        let rendered = render("{not a field} {{x}}", |_| Some("y"));
        assert_eq!(rendered, Rendered::Complete("{not a field} y".to_string()));
    }

    #[test]
    fn test_categories_are_unique() {
        let mut keys: Vec<&str> = TEMPLATES.iter().map(|(k, _)| *k).collect();
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total);
        assert_eq!(total, 49);
    }
}
