//! Fake LLM provider for tests and local development.
//!
//! Responses are picked by matching registered substrings against the
//! prompt, so tests run without network access or API costs.

use super::{LlmError, LlmProvider};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// A fake LLM provider.
///
/// Responses are matched by checking if the prompt contains a registered substring.
/// If no match is found, returns the default response or an error.
#[derive(Debug)]
pub struct FakeProvider {
    /// Map of prompt substring -> response
    responses: RwLock<HashMap<String, String>>,
    default_response: Option<String>,
}

impl Default for FakeProvider {
    /// Canned answers for every prompt this crate builds, so the server
    /// runs end to end with `POTLUCK_AI_PROVIDER=fake`.
    fn default() -> Self {
        let provider = Self::new().with_default_response("{}");
        provider.add_response(
            "task: generate_description",
            r#"{"description": "A comforting home-style dish that comes together with pantry staples."}"#,
        );
        provider.add_response(
            "task: suggest_tags",
            r#"{"tags": ["easy", "weeknight"]}"#,
        );
        provider.add_response(
            "task: estimate_nutrition",
            r#"{"calories": 420, "protein_g": 18, "carbohydrates_g": 52, "fat_g": 14, "fiber_g": 6, "sugar_g": 8, "sodium_mg": 640}"#,
        );
        provider.add_response(
            "task: recipe_ideas",
            r#"{"ideas": [{"title": "Pantry Fried Rice", "description": "Leftover rice crisped in a hot pan with whatever vegetables you have.", "uses": ["rice", "eggs"]}]}"#,
        );
        provider
    }
}

impl FakeProvider {
    /// Create a new FakeProvider with no registered responses.
    pub fn new() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
            default_response: None,
        }
    }

    /// Create a FakeProvider that returns a specific response for prompts containing a substring.
    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let provider = Self::new();
        provider.add_response(prompt_contains, response);
        provider
    }

    /// Add a response for prompts containing a specific substring.
    pub fn add_response(&self, prompt_contains: &str, response: &str) {
        self.responses
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(prompt_contains.to_lowercase(), response.to_string());
    }

    /// Set the default response when no pattern matches.
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let responses = self
            .responses
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let prompt_lower = prompt.to_lowercase();
        if let Some(response) = responses
            .iter()
            .find(|(pattern, _)| prompt_lower.contains(pattern.as_str()))
            .map(|(_, response)| response)
        {
            return Ok(response.clone());
        }

        match &self.default_response {
            Some(response) => Ok(response.clone()),
            None => Err(LlmError::RequestFailed(format!(
                "FakeProvider: No response configured for prompt (first 100 chars): {}",
                prompt.chars().take(100).collect::<String>()
            ))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}
