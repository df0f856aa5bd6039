//! Anthropic Messages API client

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{remote_error, status_error};
use crate::application::ports::outbound::{ChatMessage, LlmError, LlmPort, MessageRole};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MODEL: &str = "claude-3-haiku-20240307";
const GENERATE_MAX_TOKENS: u32 = 250;
const CHAT_MAX_TOKENS: u32 = 1500;
const NAME: &str = "Anthropic Claude";

pub struct AnthropicProvider {
    http: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(http: Client, api_key: &str) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    fn headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key).map_err(|e| LlmError::Unexpected(e.into()))?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn send(&self, request: &MessagesRequest<'_>) -> Result<String, LlmError> {
        debug!(model = MODEL, messages = request.messages.len(), "Claude messages request");

        let response = self
            .http
            .post(format!("{}/messages", self.base_url))
            .headers(self.headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| remote_error(NAME, e))?;

        if !response.status().is_success() {
            return Err(status_error(NAME, response).await);
        }

        let body: MessagesResponse = response.json().await.map_err(|e| remote_error(NAME, e))?;
        body.content
            .into_iter()
            .find_map(|block| block.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| LlmError::Remote(format!("{NAME} returned no content")))
    }
}

/// Split a leading system message off and drop empty turns
fn split_system(history: &[ChatMessage]) -> (Option<&str>, Vec<WireMessage<'_>>) {
    let (system, rest) = match history.split_first() {
        Some((first, rest)) if first.role == MessageRole::System => {
            (Some(first.content.as_str()), rest)
        }
        _ => (None, history),
    };

    let messages = rest
        .iter()
        .filter(|m| m.role != MessageRole::System && !m.content.trim().is_empty())
        .map(|m| WireMessage {
            role: m.role.as_str(),
            content: &m.content,
        })
        .collect();

    (system, messages)
}

#[async_trait]
impl LlmPort for AnthropicProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn generate_content(&self, prompt: &str) -> Result<String, LlmError> {
        let request = MessagesRequest {
            model: MODEL,
            max_tokens: GENERATE_MAX_TOKENS,
            system: None,
            messages: vec![WireMessage {
                role: "user",
                content: prompt,
            }],
        };
        self.send(&request).await
    }

    async fn get_chat_response(&self, history: &[ChatMessage]) -> Result<String, LlmError> {
        let (system, messages) = split_system(history);
        if messages.is_empty() {
            return Err(LlmError::Remote(format!(
                "No valid messages to send to {NAME}"
            )));
        }

        let request = MessagesRequest {
            model: MODEL,
            max_tokens: CHAT_MAX_TOKENS,
            system,
            messages,
        };
        self.send(&request).await
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}
