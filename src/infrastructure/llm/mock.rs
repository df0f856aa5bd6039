//! Offline provider returning canned text chosen by prompt keywords

use async_trait::async_trait;

use crate::application::ports::outbound::{ChatMessage, LlmError, LlmPort, MessageRole};

const GENERIC_MARKER: &str = "This is a mock response about";

/// (keywords, canned answer); first match wins
const CANNED: &[(&[&str], &str)] = &[
    (
        &["geographical features", "geography"],
        "The land features vast mountain ranges with deep valleys carved by ancient rivers. The central plains give way to dense forests in the east and arid badlands in the west. Notable features include the Whispering Peaks and the Sunken City ruins near the coast.",
    ),
    (
        &["climate"],
        "A temperate climate dominates the central regions with distinct seasons. Coastal areas experience mild, wet winters and warm, dry summers. The mountains have harsh, snowy winters, while the western badlands are extremely hot and arid year-round. Occasional magical storms sweep the plains.",
    ),
    (
        &["flora", "fauna", "ecology"],
        "Native plants include the luminescent moon lily and the hardy thornroot. Common animals are the six-legged mountain strider, the crystal-shelled desert crawler and the winged shadow serpents of the eastern forests.",
    ),
    (
        &["natural resources", "resources"],
        "The mountains are rich in sky-iron ore and rare energy crystals. The forests provide timber and medicinal herbs, while the plains are fertile for grain and sky-grapes. The badlands hold deposits of volatile sunstone.",
    ),
    (
        &["history", "timeline"],
        "Ancient Era: dominated by the Sky Titans. Age of Shadow: a period of decline after the Titans vanished. Rise of Kingdoms: emergence of humanoid civilizations. The Sundering: a magical cataclysm that reshaped the land. Current Age: exploration and rebuilding amid tension between factions.",
    ),
    (
        &["customs"],
        "Coming-of-age rituals involve a solitary journey into the wilderness. Seasonal festivals celebrate the harvest and the longest night with feasts, storytelling and traditional dances.",
    ),
    (
        &["traditions"],
        "Knowledge is passed through oral histories kept by Lorekeepers. Crafting techniques involving sky-iron are closely guarded guild secrets. Families keep small shrines to their ancestors.",
    ),
    (
        &["religion", "spiritual beliefs"],
        "Most cultures practice animism, worshipping local nature spirits. The Mountain Mother and the Sky Father are prominent in regional pantheons, and hidden Shadow Cults seek lost Titan knowledge.",
    ),
    (
        &["language"],
        "A Common Tongue serves trade across regions while dialects vary widely. Highland greeting: 'Varesh-na!' (May the peaks watch over you). The written script resembles angular constellations.",
    ),
    (
        &["appearance", "physical description"],
        "Highlanders are tall with weathered skin and braided hair. Forest dwellers are lithe and adorned with natural materials. Plains nomads are stocky and wear tribal facial tattoos.",
    ),
    (
        &["personality", "psychological traits"],
        "Reserved with strangers but fiercely loyal to kin. Values practicality and resilience, and is superstitious about ancient ruins and magic.",
    ),
    (
        &["backstory", "formative experiences"],
        "Born under an unusual comet sign, trained from youth in survival skills and regional lore. Left their village after a dispute with a rival clan, carrying only an ancestral blade and a map fragment.",
    ),
    (
        &["skills", "abilities"],
        "Expert tracker and navigator using stars and landmarks. Proficient in herbalism, a skilled hunter with bow and spear, with basic knowledge of ancient runes.",
    ),
    (
        &["aspirations", "goals"],
        "Seeks the legendary Sunken City and dreams of uniting the scattered highland clans. Wishes to understand the Sundering and prevent another cataclysm.",
    ),
    (
        &["faction"],
        "The Skyguard Sentinels protect ancient Titan sites. They are secretive and disciplined, navigating the skies on trained sky-mantas under Commander Elara.",
    ),
    (
        &["location"],
        "Aerie Peak is a settlement built into the cliffs of the Whispering Peaks, known for its sky-iron artisans and reachable only by narrow passes or flying mounts.",
    ),
];

pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }

    fn respond(prompt: &str) -> String {
        let lowered = prompt.to_lowercase();
        CANNED
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(_, text)| text.to_string())
            .unwrap_or_else(|| {
                let keywords: Vec<&str> = lowered.split_whitespace().filter(|w| w.len() > 4).collect();
                format!(
                    "{GENERIC_MARKER} '{}'. The world is filled with wonders and mysteries waiting to be discovered by brave explorers.",
                    keywords.join(", ")
                )
            })
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmPort for MockProvider {
    fn name(&self) -> &str {
        "Mock (No API)"
    }

    async fn generate_content(&self, prompt: &str) -> Result<String, LlmError> {
        Ok(Self::respond(prompt))
    }

    async fn get_chat_response(&self, history: &[ChatMessage]) -> Result<String, LlmError> {
        let Some(last) = history
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.trim())
        else {
            return Ok("How can I help you build your world?".to_string());
        };
        if last.is_empty() {
            return Ok("Received an empty message in chat.".to_string());
        }

        let reply = Self::respond(last);
        if reply.starts_with(GENERIC_MARKER) {
            Ok(format!(
                "Okay, let's think about '{last}'. In this world, that might involve ancient prophecies, hidden guilds or conflicts over scarce resources. What aspect interests you most?"
            ))
        } else {
            Ok(reply)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keyword_selects_canned_text() {
        let mock = MockProvider::new();
        let text = mock
            .generate_content("Describe the CLIMATE of this world")
            .await
            .unwrap();
        assert!(text.starts_with("A temperate climate"));
    }

    #[tokio::test]
    async fn test_unmatched_prompt_falls_back() {
        let text = MockProvider::new().generate_content("zzz qqqqqq").await.unwrap();
        assert!(text.contains("qqqqqq"));
    }

    #[tokio::test]
    async fn test_chat_uses_last_user_message() {
        let mock = MockProvider::new();
        let history = vec![
            ChatMessage::system("context"),
            ChatMessage::user("tell me about the history"),
            ChatMessage::assistant("sure"),
        ];
        let reply = mock.get_chat_response(&history).await.unwrap();
        assert!(reply.starts_with("Ancient Era"));

        let reply = mock
            .get_chat_response(&[ChatMessage::user("dragons")])
            .await
            .unwrap();
        assert!(reply.contains("'dragons'"));

        let reply = mock.get_chat_response(&[]).await.unwrap();
        assert_eq!(reply, "How can I help you build your world?");
    }
}
