use super::{ChatRequest, Provider};
use async_trait::async_trait;
use mentor_common::util::sanitize_for_log;
use mentor_common::LlmConfig;
use std::sync::Arc;
use std::time::Duration;

/// Single-turn prompt → reply text. Never fails.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn ask(&self, prompt: &str) -> String;
}

/// Warning returned when no API key is configured.
pub const MISSING_KEY_WARNING: &str = "⚠️ OPENAI_API_KEY is not set";

/// [`LanguageModel`] backed by a [`Provider`].
///
/// Without a provider every call answers with [`MISSING_KEY_WARNING`].
/// Provider errors become `⚠️ Language model error: ...` text.
pub struct Assistant {
    provider: Option<Arc<dyn Provider>>,
    model: String,
    max_tokens: i64,
}

impl Assistant {
    pub fn new(provider: Option<Arc<dyn Provider>>, model: impl Into<String>, max_tokens: i64) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens,
        }
    }

    /// Build from configuration, using the OpenAI provider when a key is set.
    pub fn from_config(config: &LlmConfig) -> Self {
        let provider = config.api_key().map(|key| {
            Arc::new(super::OpenAIProvider::with_base_url(
                key,
                config.base_url.clone(),
                Duration::from_secs(config.timeout_secs),
            )) as Arc<dyn Provider>
        });

        Self::new(provider, config.model.clone(), config.max_tokens)
    }

    /// Whether a provider is available.
    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }
}

#[async_trait]
impl LanguageModel for Assistant {
    async fn ask(&self, prompt: &str) -> String {
        let Some(provider) = &self.provider else {
            return MISSING_KEY_WARNING.to_string();
        };

        let request = ChatRequest::single_turn(&self.model, prompt).with_max_tokens(self.max_tokens);

        match provider.chat(request).await {
            Ok(response) => {
                tracing::info!(
                    provider = provider.name(),
                    model = %response.model,
                    latency_ms = response.latency_ms,
                    output_tokens = response.usage.output_tokens,
                    "Assistant answered"
                );
                response.content.trim().to_string()
            }
            Err(e) => {
                let message = sanitize_for_log(&e.to_string());
                tracing::error!(error = %message, "Assistant request failed");
                format!("⚠️ Language model error: {message}")
            }
        }
    }
}
