//! Google Gemini `generateContent` client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{remote_error, status_error};
use crate::application::ports::outbound::{ChatMessage, LlmError, LlmPort, MessageRole};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODEL: &str = "gemini-pro";
const NAME: &str = "Google Gemini";

pub struct GeminiProvider {
    http: Client,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(http: Client, api_key: &str) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    async fn generate(&self, contents: Vec<Content>) -> Result<String, LlmError> {
        debug!(model = MODEL, turns = contents.len(), "Gemini generateContent request");

        let response = self
            .http
            .post(format!("{}/models/{}:generateContent", self.base_url, MODEL))
            .query(&[("key", self.api_key.as_str())])
            .json(&GenerateRequest { contents })
            .send()
            .await
            .map_err(|e| remote_error(NAME, e))?;

        if !response.status().is_success() {
            return Err(status_error(NAME, response).await);
        }

        let body: GenerateResponse = response.json().await.map_err(|e| remote_error(NAME, e))?;
        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::Remote(format!(
                "{NAME} returned no content. Check safety settings or prompt."
            )));
        }
        Ok(text)
    }
}

/// Gemini only knows `user` and `model`; system context travels as a user turn
fn to_contents(history: &[ChatMessage]) -> Vec<Content> {
    history
        .iter()
        .filter(|m| !m.content.trim().is_empty())
        .map(|m| Content {
            role: match m.role {
                MessageRole::Assistant => "model",
                MessageRole::User | MessageRole::System => "user",
            }
            .to_string(),
            parts: vec![Part {
                text: m.content.clone(),
            }],
        })
        .collect()
}

#[async_trait]
impl LlmPort for GeminiProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn generate_content(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate(to_contents(&[ChatMessage::user(prompt)])).await
    }

    async fn get_chat_response(&self, history: &[ChatMessage]) -> Result<String, LlmError> {
        let contents = to_contents(history);
        if contents.is_empty() {
            return Err(LlmError::Remote(format!("No valid messages to send to {NAME}")));
        }
        self.generate(contents).await
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assistant_maps_to_model_role() {
        let contents = to_contents(&[
            ChatMessage::system("World summary"),
            ChatMessage::user("Hi"),
            ChatMessage::assistant("Hello, traveller"),
            ChatMessage::user(""),
        ]);

        let roles: Vec<&str> = contents.iter().map(|c| c.role.as_str()).collect();
        assert_eq!(roles, vec!["user", "user", "model"]);
    }

    #[test]
    fn test_blocked_response_has_no_candidates() {
        let body: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(body.candidates.is_empty());
    }
}
