//! LLM provider adapters and the registry that builds them from user settings

mod anthropic;
mod gemini;
mod huggingface;
mod mock;
mod openai;

use std::fmt;
use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;

use crate::application::ports::outbound::{LlmError, LlmPort, ProviderInitializationError};
use crate::infrastructure::config::AppConfig;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use huggingface::HuggingFaceProvider;
pub use mock::MockProvider;
pub use openai::OpenAiProvider;

/// Providers a user can bind their session to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Mock,
    Gemini,
    OpenAi,
    Anthropic,
    HuggingFace,
    DeepSeek,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 6] = [
        ProviderKind::Mock,
        ProviderKind::Gemini,
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
        ProviderKind::HuggingFace,
        ProviderKind::DeepSeek,
    ];

    /// Key accepted by `init-llm`
    pub fn key(&self) -> &'static str {
        match self {
            ProviderKind::Mock => "mock",
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::HuggingFace => "huggingface",
            ProviderKind::DeepSeek => "deepseek",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Mock => "Mock (No API)",
            ProviderKind::Gemini => "Google Gemini",
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Anthropic => "Anthropic Claude",
            ProviderKind::HuggingFace => "Hugging Face",
            ProviderKind::DeepSeek => "DeepSeek",
        }
    }

    /// Case-insensitive lookup by key
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(key))
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderKind::Mock)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Provider selection submitted by a user
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    pub provider_key: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub hf_model_id: Option<String>,
}

/// Construct the provider described by `settings`
pub fn build_provider(
    settings: &ProviderSettings,
    config: &AppConfig,
) -> Result<Arc<dyn LlmPort>, ProviderInitializationError> {
    let kind = ProviderKind::from_key(&settings.provider_key)
        .ok_or_else(|| ProviderInitializationError::UnknownProvider(settings.provider_key.clone()))?;

    let api_key = non_blank(settings.api_key.as_deref());
    if kind.requires_api_key() && api_key.is_none() {
        return Err(ProviderInitializationError::MissingApiKey(
            kind.display_name().to_string(),
        ));
    }
    let api_key = api_key.unwrap_or_default();

    let provider: Arc<dyn LlmPort> = match kind {
        ProviderKind::Mock => Arc::new(MockProvider::new()),
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::openai(
            http_client(kind, config)?,
            api_key,
        )),
        ProviderKind::DeepSeek => Arc::new(OpenAiProvider::deepseek(
            http_client(kind, config)?,
            api_key,
            &config.app_name,
            &config.app_url,
        )),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(
            http_client(kind, config)?,
            api_key,
        )),
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(http_client(kind, config)?, api_key)),
        ProviderKind::HuggingFace => {
            let model_id = non_blank(settings.hf_model_id.as_deref()).ok_or_else(|| {
                ProviderInitializationError::MissingModelId(kind.display_name().to_string())
            })?;
            Arc::new(HuggingFaceProvider::new(
                http_client(kind, config)?,
                api_key,
                model_id,
                config.huggingface_max_retries,
                config.huggingface_initial_backoff_ms,
            ))
        }
    };

    tracing::info!(provider = %kind, "LLM provider initialized");
    Ok(provider)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn http_client(kind: ProviderKind, config: &AppConfig) -> Result<Client, ProviderInitializationError> {
    Client::builder()
        .timeout(config.llm_request_timeout())
        .build()
        .map_err(|source| ProviderInitializationError::Client {
            provider: kind.display_name().to_string(),
            source,
        })
}

/// Map a transport or decoding failure to a provider error
pub(crate) fn remote_error(provider: &str, err: reqwest::Error) -> LlmError {
    LlmError::Remote(format!("{provider} request failed: {err}"))
}

/// Map a non-success HTTP answer to a provider error
pub(crate) async fn status_error(provider: &str, response: reqwest::Response) -> LlmError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    LlmError::Remote(format!("{provider} API error ({status}): {body}"))
}
