//! Hugging Face Inference API client
//!
//! Hosted models are cold-started on demand: a 503 carries an
//! `estimated_time` until the model is loaded, and 429 signals rate limiting.
//! Both are retried with exponential backoff plus jitter.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{remote_error, status_error};
use crate::application::ports::outbound::{ChatMessage, LlmError, LlmPort, MessageRole};

const HF_API_URL: &str = "https://api-inference.huggingface.co/models";
const NAME: &str = "Hugging Face";
const MAX_NEW_TOKENS: u32 = 250;
const TEMPERATURE: f32 = 0.7;
const MAX_BACKOFF: Duration = Duration::from_secs(60);

pub struct HuggingFaceProvider {
    http: Client,
    api_key: String,
    model_id: String,
    base_url: String,
    max_retries: u32,
    initial_backoff: Duration,
}

impl HuggingFaceProvider {
    pub fn new(
        http: Client,
        api_key: &str,
        model_id: &str,
        max_retries: u32,
        initial_backoff_ms: u64,
    ) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            model_id: model_id.to_string(),
            base_url: HF_API_URL.to_string(),
            max_retries,
            initial_backoff: Duration::from_millis(initial_backoff_ms),
        }
    }

    async fn query(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/{}", self.base_url, self.model_id);
        let request = InferenceRequest {
            inputs: prompt,
            parameters: Parameters {
                max_new_tokens: MAX_NEW_TOKENS,
                return_full_text: false,
                temperature: TEMPERATURE,
            },
        };

        let mut backoff = self.initial_backoff;
        let mut attempt = 0;
        loop {
            debug!(model = %self.model_id, attempt, "Hugging Face inference request");
            let result = self
                .http
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await;
            let retries_left = attempt < self.max_retries;

            let response = match result {
                Ok(response) => response,
                Err(err) if retries_left => {
                    warn!(error = %err, attempt, "Hugging Face request failed, retrying");
                    tokio::time::sleep(with_jitter(backoff)).await;
                    backoff = next_backoff(backoff);
                    attempt += 1;
                    continue;
                }
                Err(err) => return Err(remote_error(NAME, err)),
            };

            let status = response.status();
            if status.is_success() {
                let body: Value = response.json().await.map_err(|e| remote_error(NAME, e))?;
                return extract_generated_text(&body);
            }

            if retries_left && is_retryable(status) {
                let estimated = if status == StatusCode::SERVICE_UNAVAILABLE {
                    response
                        .json::<Value>()
                        .await
                        .ok()
                        .as_ref()
                        .and_then(estimated_time)
                } else {
                    None
                };
                let wait = estimated.unwrap_or_else(|| with_jitter(backoff)).min(MAX_BACKOFF);
                warn!(
                    status = %status,
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    model = %self.model_id,
                    "Hugging Face model busy, retrying"
                );
                tokio::time::sleep(wait).await;
                backoff = next_backoff(backoff);
                attempt += 1;
                continue;
            }

            return Err(status_error(NAME, response).await);
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::SERVICE_UNAVAILABLE || status == StatusCode::TOO_MANY_REQUESTS
}

fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}

/// Add up to 25% random jitter
fn with_jitter(base: Duration) -> Duration {
    let spread = (base.as_millis() as u64) / 4;
    let jitter = if spread == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..=spread)
    };
    base + Duration::from_millis(jitter)
}

fn estimated_time(body: &Value) -> Option<Duration> {
    body.get("estimated_time")
        .and_then(Value::as_f64)
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .map(|secs| Duration::from_secs_f64(secs.min(MAX_BACKOFF.as_secs_f64())))
}

/// Text generation answers as `[{"generated_text": ...}]` or a bare object
fn extract_generated_text(body: &Value) -> Result<String, LlmError> {
    let first = match body {
        Value::Array(items) => items.first(),
        other => Some(other),
    };

    if let Some(error) = first.and_then(|v| v.get("error")).and_then(Value::as_str) {
        return Err(LlmError::Remote(format!("{NAME} API error: {error}")));
    }

    first
        .and_then(|v| v.get("generated_text"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            LlmError::Remote(format!(
                "Could not parse 'generated_text' from {NAME} response"
            ))
        })
}

/// Instruction format used by Mistral and Llama 2 chat models
fn format_chat(history: &[ChatMessage]) -> String {
    let (system, turns) = match history.split_first() {
        Some((first, rest)) if first.role == MessageRole::System => {
            (format!("<<SYS>>\n{}\n<</SYS>>\n\n", first.content), rest)
        }
        _ => (String::new(), history),
    };

    let mut out = String::new();
    let mut previous: Option<MessageRole> = None;
    for message in turns {
        let content = message.content.trim();
        if content.is_empty() {
            continue;
        }
        match message.role {
            MessageRole::User => {
                if previous != Some(MessageRole::User) {
                    out.push_str("[INST] ");
                }
                out.push_str(content);
                out.push_str(" [/INST]");
            }
            MessageRole::Assistant => {
                out.push_str(content);
                out.push(' ');
            }
            MessageRole::System => continue,
        }
        previous = Some(message.role);
    }

    let body = out.trim_end();
    if body.is_empty() {
        String::new()
    } else {
        format!("{system}{body}")
    }
}

#[async_trait]
impl LlmPort for HuggingFaceProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn generate_content(&self, prompt: &str) -> Result<String, LlmError> {
        self.query(prompt).await
    }

    async fn get_chat_response(&self, history: &[ChatMessage]) -> Result<String, LlmError> {
        let prompt = format_chat(history);
        if prompt.is_empty() {
            return Err(LlmError::Remote(format!(
                "Could not format chat messages for {NAME}"
            )));
        }
        self.query(&prompt).await
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct Parameters {
    max_new_tokens: u32,
    return_full_text: bool,
    temperature: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_chat_wraps_turns() {
        let prompt = format_chat(&[
            ChatMessage::system("Lore"),
            ChatMessage::user("Who rules?"),
            ChatMessage::assistant("The Iron Hand."),
            ChatMessage::user("Since when?"),
        ]);

        assert_eq!(
            prompt,
            "<<SYS>>\nLore\n<</SYS>>\n\n[INST] Who rules? [/INST]The Iron Hand. [INST] Since when? [/INST]"
        );
    }

    #[test]
    fn test_format_chat_empty_history() {
        assert_eq!(format_chat(&[ChatMessage::system("Lore")]), "");
    }

    #[test]
    fn test_extract_generated_text_shapes() {
        let list = json!([{ "generated_text": "  A cold wind.  " }]);
        assert_eq!(extract_generated_text(&list).unwrap(), "A cold wind.");

        let object = json!({ "generated_text": "Rain." });
        assert_eq!(extract_generated_text(&object).unwrap(), "Rain.");

        let error = json!({ "error": "Model is overloaded" });
        assert!(matches!(
            extract_generated_text(&error),
            Err(LlmError::Remote(ref m)) if m.contains("overloaded")
        ));

        assert!(extract_generated_text(&json!([])).is_err());
    }

    #[test]
    fn test_backoff_and_estimated_time() {
        assert_eq!(next_backoff(Duration::from_secs(5)), Duration::from_secs(10));
        assert_eq!(next_backoff(Duration::from_secs(50)), MAX_BACKOFF);

        let jittered = with_jitter(Duration::from_millis(1000));
        assert!(jittered >= Duration::from_millis(1000));
        assert!(jittered <= Duration::from_millis(1250));

        assert_eq!(
            estimated_time(&json!({ "estimated_time": 1.5 })),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(estimated_time(&json!({ "estimated_time": 0 })), None);
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_retryable(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_huge_estimated_time_is_capped() {
        assert_eq!(
            estimated_time(&json!({ "estimated_time": 1e30 })),
            Some(MAX_BACKOFF)
        );
        assert_eq!(
            estimated_time(&json!({ "estimated_time": f64::MAX })),
            Some(MAX_BACKOFF)
        );
    }
}
