//! Recipe enrichment system.
//!
//! Each enrichment is a stateless struct implementing the `Enrichment`
//! trait: it builds a prompt from the relevant part of a recipe, sends it
//! to an LLM provider, and applies the reply to a copy of the recipe.

mod estimate_nutrition;
mod generate_description;
mod suggest_tags;

pub use estimate_nutrition::EstimateNutrition;
pub use generate_description::GenerateDescription;
pub use suggest_tags::SuggestTags;

use crate::llm::{extract_json, LlmError, LlmProvider};
use crate::types::RecipeContent;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for enrichment operations.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Failed to parse LLM response: {0}")]
    Parse(String),

    #[error("Enrichment produced invalid data: {0}")]
    Validation(String),
}

/// Information about an enrichment type for the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EnrichmentInfo {
    #[serde(rename = "type")]
    pub enrichment_type: String,
    pub display_name: String,
    pub description: String,
    pub output_fields: Vec<String>,
}

/// Trait for recipe enrichment types.
#[async_trait]
pub trait Enrichment: Send + Sync + std::fmt::Debug {
    /// Type identifier for the API (e.g., "suggest_tags").
    fn enrichment_type(&self) -> &'static str;

    /// Display name for UI (e.g., "Suggest Tags").
    fn display_name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Which recipe fields this enrichment is allowed to modify.
    fn output_fields(&self) -> &'static [&'static str];

    /// Build the prompt for the LLM.
    ///
    /// Should only include relevant parts of the recipe, not the entire object.
    fn build_prompt(&self, recipe: &RecipeContent) -> String;

    /// Parse LLM response and apply to recipe.
    ///
    /// Must start from `original.clone()` and only modify fields listed in `output_fields()`.
    fn apply_response(
        &self,
        original: &RecipeContent,
        response: &str,
    ) -> Result<RecipeContent, EnrichmentError>;

    /// Run the full enrichment (build prompt, call LLM, apply response).
    async fn run(
        &self,
        provider: &dyn LlmProvider,
        recipe: &RecipeContent,
    ) -> Result<RecipeContent, EnrichmentError> {
        let prompt = self.build_prompt(recipe);
        tracing::debug!(
            enrichment = self.enrichment_type(),
            provider = provider.provider_name(),
            model = provider.model_name(),
            "Running enrichment"
        );
        let response = provider.complete(&prompt).await?;
        self.apply_response(recipe, &response)
    }

    /// Get enrichment info for the API.
    fn info(&self) -> EnrichmentInfo {
        EnrichmentInfo {
            enrichment_type: self.enrichment_type().to_string(),
            display_name: self.display_name().to_string(),
            description: self.description().to_string(),
            output_fields: self.output_fields().iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Registry of all available enrichment types.
pub static ALL_ENRICHMENTS: &[&dyn Enrichment] =
    &[&GenerateDescription, &SuggestTags, &EstimateNutrition];

/// Get an enrichment by type name.
pub fn get_enrichment(type_name: &str) -> Option<&'static dyn Enrichment> {
    ALL_ENRICHMENTS
        .iter()
        .find(|e| e.enrichment_type() == type_name)
        .copied()
}

/// Get info for all available enrichments.
pub fn all_enrichment_info() -> Vec<EnrichmentInfo> {
    ALL_ENRICHMENTS.iter().map(|e| e.info()).collect()
}

/// Deserialize the JSON object in a model reply.
pub(crate) fn parse_reply<T: DeserializeOwned>(response: &str) -> Result<T, EnrichmentError> {
    serde_json::from_str(extract_json(response)).map_err(|e| EnrichmentError::Parse(e.to_string()))
}

/// Shared recipe header used by the prompts.
pub(crate) fn recipe_summary(recipe: &RecipeContent) -> String {
    let mut summary = format!("Title: {}\n", recipe.title);
    if let Some(servings) = recipe.servings {
        summary.push_str(&format!("Servings: {}\n", servings));
    }
    if !recipe.ingredients.is_empty() {
        summary.push_str("Ingredients:\n");
        summary.push_str(&recipe.ingredients_text());
        summary.push('\n');
    }
    if !recipe.instructions.trim().is_empty() {
        summary.push_str("Instructions:\n");
        summary.push_str(recipe.instructions.trim());
        summary.push('\n');
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FakeProvider;
    use crate::types::Ingredient;

    fn sample_recipe() -> RecipeContent {
        RecipeContent {
            title: "Tomato Soup".to_string(),
            ingredients: vec![
                Ingredient::new("tomatoes").with_amount("6", None),
                Ingredient::new("vegetable stock").with_amount("2", Some("cups")),
            ],
            instructions: "Simmer everything and blend.".to_string(),
            servings: Some(4),
            tags: vec!["Soup".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_get_enrichment() {
        let enrichment = get_enrichment("suggest_tags");
        assert!(enrichment.is_some());
        assert_eq!(enrichment.unwrap().display_name(), "Suggest Tags");
    }

    #[test]
    fn test_get_enrichment_not_found() {
        assert!(get_enrichment("nonexistent").is_none());
    }

    #[test]
    fn test_all_enrichment_info() {
        let info = all_enrichment_info();
        assert_eq!(info.len(), 3);
        assert!(info
            .iter()
            .any(|i| i.enrichment_type == "generate_description"));
        assert!(info.iter().any(|i| i.enrichment_type == "suggest_tags"));
        assert!(info
            .iter()
            .any(|i| i.enrichment_type == "estimate_nutrition"));
    }

    #[test]
    fn test_all_enrichments_have_output_fields() {
        for enrichment in ALL_ENRICHMENTS {
            assert!(
                !enrichment.output_fields().is_empty(),
                "{} has no output fields",
                enrichment.enrichment_type()
            );
        }
    }

    #[test]
    fn test_recipe_summary() {
        let summary = recipe_summary(&sample_recipe());
        assert!(summary.contains("Title: Tomato Soup"));
        assert!(summary.contains("- 2 cups vegetable stock"));
        assert!(summary.contains("Servings: 4"));
    }

    #[tokio::test]
    async fn test_run_with_default_fake_provider() {
        let provider = FakeProvider::default();
        for enrichment in ALL_ENRICHMENTS {
            let result = enrichment.run(&provider, &sample_recipe()).await;
            assert!(
                result.is_ok(),
                "{} failed: {:?}",
                enrichment.enrichment_type(),
                result
            );
        }
    }

    #[tokio::test]
    async fn test_run_propagates_llm_error() {
        let provider = FakeProvider::new();
        let result = SuggestTags.run(&provider, &sample_recipe()).await;
        assert!(matches!(result, Err(EnrichmentError::Llm(_))));
    }
}
