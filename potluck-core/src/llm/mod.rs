//! LLM provider abstraction for recipe enrichment.
//!
//! This module provides a trait-based abstraction over chat-completion
//! providers (OpenAI-compatible APIs, Claude) with a fake for tests.

mod claude;
mod fake;
mod openai;

pub use claude::ClaudeProvider;
pub use fake::FakeProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Default model when POTLUCK_AI_MODEL is unset, per provider.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-haiku-20241022";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Error type for LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Trait for LLM providers.
///
/// Implementations should be stateless and thread-safe. The provider is responsible
/// for making API calls and returning the model's text response.
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    /// Send a prompt to the LLM and get a text response.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Get the provider name (e.g., "openai", "claude", "fake").
    fn provider_name(&self) -> &'static str;

    /// Get the model name (e.g., "gpt-4o-mini").
    fn model_name(&self) -> &str;
}

/// Build the provider selected by environment variables:
/// - POTLUCK_AI_PROVIDER: "openai" | "claude" | "fake" (default: "fake")
/// - POTLUCK_AI_MODEL: Model name (provider-specific)
/// - OPENAI_API_KEY / OPENAI_BASE_URL: for "openai"
/// - ANTHROPIC_API_KEY: for "claude"
pub fn create_provider_from_env() -> Result<Box<dyn LlmProvider>, LlmError> {
    let provider = std::env::var("POTLUCK_AI_PROVIDER").unwrap_or_else(|_| "fake".to_string());
    let model = std::env::var("POTLUCK_AI_MODEL").ok();

    match provider.as_str() {
        "fake" => Ok(Box::new(FakeProvider::default())),
        "openai" => {
            let api_key = std::env::var("OPENAI_API_KEY")
                .map_err(|_| LlmError::NotConfigured("OPENAI_API_KEY not set".to_string()))?;
            let base_url = std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string());
            Ok(Box::new(OpenAiProvider::new(
                api_key,
                model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                base_url,
            )))
        }
        "claude" => {
            let api_key = std::env::var("ANTHROPIC_API_KEY")
                .map_err(|_| LlmError::NotConfigured("ANTHROPIC_API_KEY not set".to_string()))?;
            Ok(Box::new(ClaudeProvider::new(
                api_key,
                model.unwrap_or_else(|| DEFAULT_CLAUDE_MODEL.to_string()),
            )))
        }
        other => Err(LlmError::NotConfigured(format!(
            "Unknown provider: {}",
            other
        ))),
    }
}

/// Pull the JSON payload out of a model reply.
///
/// Models often wrap JSON in a ```json fence or add a sentence around it.
pub fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();
    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after_fence[body_start..];
        if let Some(end) = body.find("```") {
            return body[..end].trim();
        }
    }

    let first = trimmed.find(['{', '[']);
    let last = trimmed.rfind(['}', ']']);
    match (first, last) {
        (Some(start), Some(end)) if end > start => &trimmed[start..=end],
        _ => trimmed,
    }
}

/// Map an HTTP error from a provider into an LlmError.
pub(crate) fn status_error(status: u16, retry_after: Option<u64>, message: String) -> LlmError {
    if status == 429 {
        LlmError::RateLimited {
            retry_after_secs: retry_after,
        }
    } else {
        LlmError::ApiError { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_plain() {
        assert_eq!(extract_json(r#" {"a": 1} "#), r#"{"a": 1}"#);
    }

    #[test]
    fn test_extract_json_fenced() {
        let reply = "Here you go:\n```json\n{\"tags\": [\"quick\"]}\n```\nEnjoy!";
        assert_eq!(extract_json(reply), "{\"tags\": [\"quick\"]}");
    }

    #[test]
    fn test_extract_json_with_prose() {
        let reply = "Sure! [{\"title\": \"Soup\"}] Hope that helps.";
        assert_eq!(extract_json(reply), "[{\"title\": \"Soup\"}]");
    }

    #[test]
    fn test_status_error_rate_limited() {
        let err = status_error(429, Some(3), String::new());
        assert!(matches!(
            err,
            LlmError::RateLimited {
                retry_after_secs: Some(3)
            }
        ));
    }
}
