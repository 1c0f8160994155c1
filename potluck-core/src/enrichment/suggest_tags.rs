//! SuggestTags enrichment.
//!
//! Suggested tags are normalized to lowercase and appended after the
//! recipe's existing tags; tags already present (in any casing) are skipped.

use super::{parse_reply, recipe_summary, Enrichment, EnrichmentError};
use crate::types::RecipeContent;
use async_trait::async_trait;
use serde::Deserialize;

/// Most tags taken from one suggestion.
pub const MAX_SUGGESTED_TAGS: usize = 8;

#[derive(Debug, Clone, Copy)]
pub struct SuggestTags;

#[derive(Debug, Deserialize)]
struct TagsResponse {
    tags: Vec<String>,
}

fn merge_tags(existing: &[String], suggested: Vec<String>) -> Vec<String> {
    let mut merged = existing.to_vec();
    let mut added = 0;

    for tag in suggested {
        if added == MAX_SUGGESTED_TAGS {
            break;
        }
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || merged.iter().any(|t| t.to_lowercase() == tag) {
            continue;
        }
        merged.push(tag);
        added += 1;
    }

    merged
}

#[async_trait]
impl Enrichment for SuggestTags {
    fn enrichment_type(&self) -> &'static str {
        "suggest_tags"
    }

    fn display_name(&self) -> &'static str {
        "Suggest Tags"
    }

    fn description(&self) -> &'static str {
        "Suggest tags such as cuisine, course, and diet"
    }

    fn output_fields(&self) -> &'static [&'static str] {
        &["tags"]
    }

    fn build_prompt(&self, recipe: &RecipeContent) -> String {
        let existing = if recipe.tags.is_empty() {
            "(none)".to_string()
        } else {
            recipe.tags.join(", ")
        };

        format!(
            r#"TASK: suggest_tags

You are a recipe tagging assistant. Suggest up to {max} short, lowercase tags for this recipe covering cuisine, course, main ingredient, diet, and effort (for example "italian", "dessert", "vegetarian", "quick"). Do not repeat tags it already has.

{summary}
Existing tags: {existing}

Respond with JSON only, no other text: {{"tags": ["tag1", "tag2"]}}"#,
            max = MAX_SUGGESTED_TAGS,
            summary = recipe_summary(recipe),
            existing = existing
        )
    }

    fn apply_response(
        &self,
        original: &RecipeContent,
        response: &str,
    ) -> Result<RecipeContent, EnrichmentError> {
        let parsed: TagsResponse = parse_reply(response)?;

        let mut enriched = original.clone();
        enriched.tags = merge_tags(&original.tags, parsed.tags);
        Ok(enriched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_keeps_existing_order() {
        let merged = merge_tags(&tags(&["Dinner", "soup"]), tags(&["Italian", "dinner", "quick"]));
        assert_eq!(merged, tags(&["Dinner", "soup", "italian", "quick"]));
    }

    #[test]
    fn test_merge_caps_suggestions() {
        let suggested: Vec<String> = (0..12).map(|i| format!("tag{}", i)).collect();
        let merged = merge_tags(&tags(&["existing"]), suggested);
        assert_eq!(merged.len(), 1 + MAX_SUGGESTED_TAGS);
        assert_eq!(merged.last().map(String::as_str), Some("tag7"));
    }

    #[test]
    fn test_merge_skips_blank_and_duplicate_suggestions() {
        let merged = merge_tags(&[], tags(&["  Vegan ", "", "vegan"]));
        assert_eq!(merged, tags(&["vegan"]));
    }

    #[test]
    fn test_apply_response_with_fence() {
        let original = RecipeContent {
            title: "Pad Thai".to_string(),
            tags: tags(&["noodles"]),
            ..Default::default()
        };
        let enriched = SuggestTags
            .apply_response(&original, "```json\n{\"tags\": [\"Thai\", \"Noodles\"]}\n```")
            .unwrap();
        assert_eq!(enriched.tags, tags(&["noodles", "thai"]));
        assert_eq!(enriched.title, "Pad Thai");
    }

    #[test]
    fn test_prompt_lists_existing_tags() {
        let recipe = RecipeContent {
            title: "Pad Thai".to_string(),
            tags: tags(&["noodles", "thai"]),
            ..Default::default()
        };
        let prompt = SuggestTags.build_prompt(&recipe);
        assert!(prompt.contains("Existing tags: noodles, thai"));
    }
}
