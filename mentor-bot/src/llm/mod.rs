//! Language model access.
//!
//! [`Provider`] is the raw, fallible chat-completion API. [`LanguageModel`] is
//! what the dispatcher talks to: a single-turn prompt in, a display-ready
//! string out, with every failure already turned into warning text.

mod assistant;
mod openai;

pub use assistant::{Assistant, LanguageModel};
pub use openai::OpenAIProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ============================================================================
// Provider Trait
// ============================================================================

/// Chat completion backend.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Send a chat completion request.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError>;
}

/// Error from a provider.
#[derive(Debug, Clone, thiserror::Error)]
#[error("[{provider}:{model}] {message}")]
pub struct ProviderError {
    pub provider: String,
    pub model: String,
    pub message: String,
    pub status_code: Option<u16>,
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
}

impl ChatRequest {
    /// Single user message, no history.
    pub fn single_turn(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![Message {
                role: "user".into(),
                content: prompt.into(),
            }],
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: i64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Chat completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub model: String,
    pub content: String,
    pub usage: TokenUsage,
    pub finish_reason: Option<String>,
    /// Response latency in milliseconds
    pub latency_ms: u64,
}

/// Token usage information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub total_tokens: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_turn_request() {
        let request = ChatRequest::single_turn("gpt-4o-mini", "hello").with_max_tokens(350);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
        assert_eq!(request.messages[0].content, "hello");
        assert_eq!(request.max_tokens, Some(350));
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError {
            provider: "openai".into(),
            model: "gpt-4o-mini".into(),
            message: "API error: quota".into(),
            status_code: Some(429),
        };
        assert_eq!(err.to_string(), "[openai:gpt-4o-mini] API error: quota");
    }
}
