//! OpenAI-compatible chat completions provider.

use super::{ChatRequest, ChatResponse, Provider, ProviderError, TokenUsage};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// OpenAI API provider.
pub struct OpenAIProvider {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAIProvider {
    /// Create a provider for the public OpenAI API.
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, "https://api.openai.com", Duration::from_secs(120))
    }

    /// Create with a custom base URL (Azure OpenAI or any compatible API).
    ///
    /// Accepts the base with or without the `/v1` suffix, so both
    /// `https://api.openai.com` and `https://api.openai.com/v1` work.
    pub fn with_base_url(api_key: &str, base_url: impl Into<String>, timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: normalize_base_url(&base_url.into()),
        }
    }

    fn error(model: &str, message: String, status_code: Option<u16>) -> ProviderError {
        ProviderError {
            provider: "openai".into(),
            model: model.to_string(),
            message,
            status_code,
        }
    }
}

fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    trimmed
        .strip_suffix("/v1")
        .unwrap_or(trimmed)
        .to_string()
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let start = Instant::now();
        let url = format!("{}/v1/chat/completions", self.base_url);

        let openai_request = OpenAIRequest {
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| OpenAIMessage {
                    role: m.role.clone(),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| Self::error(&request.model, format!("Request failed: {e}"), None))?;

        let status = response.status();
        let latency_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::error(
                &request.model,
                format!("API error: {body}"),
                Some(status.as_u16()),
            ));
        }

        let openai_response: OpenAIResponse = response.json().await.map_err(|e| {
            Self::error(&request.model, format!("Failed to parse response: {e}"), None)
        })?;

        let first = openai_response.choices.into_iter().next();
        let finish_reason = first.as_ref().and_then(|c| c.finish_reason.clone());
        let content = first
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let usage = openai_response.usage.unwrap_or_default();

        tracing::debug!(
            model = %openai_response.model,
            latency_ms,
            output_tokens = usage.completion_tokens,
            "Chat completion received"
        );

        Ok(ChatResponse {
            model: openai_response.model,
            content,
            usage: TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            },
            finish_reason,
            latency_ms,
        })
    }
}

// ============================================================================
// OpenAI API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<i64>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    /// Null when the model returns only a refusal or tool call
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: i64,
    completion_tokens: i64,
    total_tokens: i64,
}
