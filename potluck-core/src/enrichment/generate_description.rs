//! GenerateDescription enrichment.

use super::{parse_reply, recipe_summary, Enrichment, EnrichmentError};
use crate::types::RecipeContent;
use async_trait::async_trait;
use serde::Deserialize;

/// Longest description we store.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Writes a short description of the dish from its ingredients and steps.
#[derive(Debug, Clone, Copy)]
pub struct GenerateDescription;

#[derive(Debug, Deserialize)]
struct DescriptionResponse {
    description: String,
}

/// Cut to `max` characters, preferring the end of a sentence.
fn truncate_description(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    match cut.rfind(['.', '!', '?']) {
        Some(end) => cut[..=end].to_string(),
        None => cut.trim_end().to_string(),
    }
}

#[async_trait]
impl Enrichment for GenerateDescription {
    fn enrichment_type(&self) -> &'static str {
        "generate_description"
    }

    fn display_name(&self) -> &'static str {
        "Generate Description"
    }

    fn description(&self) -> &'static str {
        "Write a short description of the dish"
    }

    fn output_fields(&self) -> &'static [&'static str] {
        &["description"]
    }

    fn build_prompt(&self, recipe: &RecipeContent) -> String {
        format!(
            r#"TASK: generate_description

You write descriptions for a home cook's recipe collection. Describe this dish in 1 to 3 sentences: what it is, how it tastes, and when you would make it. Do not list the ingredients. At most {max} characters.

{summary}
Respond with JSON only, no other text: {{"description": "..."}}"#,
            max = MAX_DESCRIPTION_CHARS,
            summary = recipe_summary(recipe)
        )
    }

    fn apply_response(
        &self,
        original: &RecipeContent,
        response: &str,
    ) -> Result<RecipeContent, EnrichmentError> {
        let parsed: DescriptionResponse = parse_reply(response)?;
        let description = parsed.description.trim();
        if description.is_empty() {
            return Err(EnrichmentError::Validation(
                "Description is empty".to_string(),
            ));
        }

        let mut enriched = original.clone();
        enriched.description = Some(truncate_description(description, MAX_DESCRIPTION_CHARS));
        Ok(enriched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe() -> RecipeContent {
        RecipeContent {
            title: "Banana Bread".to_string(),
            instructions: "Mash, mix, bake.".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_prompt_mentions_title() {
        let prompt = GenerateDescription.build_prompt(&recipe());
        assert!(prompt.contains("Banana Bread"));
        assert!(prompt.starts_with("TASK: generate_description"));
    }

    #[test]
    fn test_apply_sets_description_only() {
        let original = recipe();
        let enriched = GenerateDescription
            .apply_response(&original, r#"{"description": "  Moist and sweet.  "}"#)
            .unwrap();
        assert_eq!(enriched.description.as_deref(), Some("Moist and sweet."));
        assert_eq!(enriched.title, original.title);
        assert_eq!(enriched.instructions, original.instructions);
    }

    #[test]
    fn test_apply_rejects_empty() {
        let result = GenerateDescription.apply_response(&recipe(), r#"{"description": " "}"#);
        assert!(matches!(result, Err(EnrichmentError::Validation(_))));
    }

    #[test]
    fn test_apply_rejects_garbage() {
        let result = GenerateDescription.apply_response(&recipe(), "I cannot help with that");
        assert!(matches!(result, Err(EnrichmentError::Parse(_))));
    }

    #[test]
    fn test_truncate_at_sentence() {
        let long = format!("Short first sentence. {}", "word ".repeat(200));
        let truncated = truncate_description(&long, MAX_DESCRIPTION_CHARS);
        assert_eq!(truncated, "Short first sentence.");
    }

    #[test]
    fn test_truncate_without_sentence_end() {
        let long = "a".repeat(600);
        assert_eq!(truncate_description(&long, 500).len(), 500);
    }
}
