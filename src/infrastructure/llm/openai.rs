//! OpenAI-compatible chat completions client
//!
//! Serves both OpenAI itself and DeepSeek through OpenRouter, which speaks the
//! same wire format but wants attribution headers.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{remote_error, status_error};
use crate::application::ports::outbound::{ChatMessage, LlmError, LlmPort};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
const OPENAI_MODEL: &str = "gpt-3.5-turbo";
const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";
const DEEPSEEK_MODEL: &str = "deepseek/deepseek-r1:free";

pub struct OpenAiProvider {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
    name: &'static str,
    attribution: Option<(String, String)>,
}

impl OpenAiProvider {
    pub fn openai(http: Client, api_key: &str) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            base_url: OPENAI_API_URL.to_string(),
            model: OPENAI_MODEL.to_string(),
            name: "OpenAI",
            attribution: None,
        }
    }

    /// DeepSeek R1 routed through OpenRouter
    pub fn deepseek(http: Client, api_key: &str, app_name: &str, app_url: &str) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            base_url: OPENROUTER_API_URL.to_string(),
            model: DEEPSEEK_MODEL.to_string(),
            name: "DeepSeek",
            attribution: Some((app_name.to_string(), app_url.to_string())),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| LlmError::Unexpected(e.into()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some((app_name, app_url)) = &self.attribution {
            if let Ok(value) = HeaderValue::from_str(app_url) {
                headers.insert("HTTP-Referer", value);
            }
            if let Ok(value) = HeaderValue::from_str(app_name) {
                headers.insert("X-Title", value);
            }
        }
        Ok(headers)
    }

    async fn complete(&self, messages: Vec<WireMessage<'_>>) -> Result<String, LlmError> {
        let request = CompletionRequest {
            model: &self.model,
            messages,
        };
        debug!(model = %self.model, provider = self.name, "Chat completion request");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| remote_error(self.name, e))?;

        if !response.status().is_success() {
            return Err(status_error(self.name, response).await);
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| remote_error(self.name, e))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| LlmError::Remote(format!("{} returned no choices", self.name)))
    }
}

#[async_trait]
impl LlmPort for OpenAiProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn generate_content(&self, prompt: &str) -> Result<String, LlmError> {
        self.complete(vec![WireMessage {
            role: "user",
            content: prompt,
        }])
        .await
    }

    async fn get_chat_response(&self, history: &[ChatMessage]) -> Result<String, LlmError> {
        let messages = history
            .iter()
            .map(|m| WireMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect();
        self.complete(messages).await
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deepseek_sends_attribution_headers() {
        let provider =
            OpenAiProvider::deepseek(Client::new(), "key", "WorldForge", "http://localhost:3000");
        let headers = provider.headers().unwrap();

        assert_eq!(headers["X-Title"], "WorldForge");
        assert_eq!(headers["HTTP-Referer"], "http://localhost:3000");
        assert_eq!(headers[AUTHORIZATION], "Bearer key");
        assert_eq!(provider.model, DEEPSEEK_MODEL);
    }

    #[test]
    fn test_invalid_key_is_an_adapter_fault() {
        let provider = OpenAiProvider::openai(Client::new(), "bad\nkey");
        assert!(matches!(provider.headers(), Err(LlmError::Unexpected(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_remote_error() {
        let provider =
            OpenAiProvider::openai(Client::new(), "key").with_base_url("http://127.0.0.1:9");
        let err = provider.generate_content("hello").await.unwrap_err();
        assert!(matches!(err, LlmError::Remote(ref m) if m.contains("OpenAI")));
    }

    #[test]
    fn test_response_parsing_tolerates_null_content() {
        let body: CompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
                .unwrap();
        assert!(body.choices[0].message.content.is_none());
    }
}
