//! Recipe ideas from what the cook has on hand.

use serde::Deserialize;
use thiserror::Error;

use crate::llm::{extract_json, LlmError, LlmProvider};
use crate::types::RecipeIdea;

/// Most ideas returned by one request.
pub const MAX_IDEAS: usize = 10;

/// Titles listed in the prompt as "already in the collection".
const MAX_AVOID_TITLES: usize = 50;

#[derive(Debug, Error)]
pub enum IdeasError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Failed to parse LLM response: {0}")]
    Parse(String),

    #[error("No ingredients given")]
    EmptyPantry,
}

#[derive(Debug, Deserialize)]
struct IdeasResponse {
    ideas: Vec<RecipeIdea>,
}

pub fn render_ideas_prompt(pantry: &[String], avoid_titles: &[String], count: usize) -> String {
    let avoid = if avoid_titles.is_empty() {
        "(none)".to_string()
    } else {
        avoid_titles
            .iter()
            .take(MAX_AVOID_TITLES)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("; ")
    };

    format!(
        r#"TASK: recipe_ideas

You help a home cook decide what to make. Suggest {count} different dishes that can be made mostly from these ingredients, assuming basic staples (salt, pepper, oil, water) are available.

Ingredients on hand: {pantry}

The cook already has recipes with these titles, so do not suggest them: {avoid}

For each idea give a title, a one or two sentence description, and which of the listed ingredients it uses.

Respond with JSON only, no other text: {{"ideas": [{{"title": "...", "description": "...", "uses": ["..."]}}]}}"#,
        count = count,
        pantry = pantry.join(", "),
        avoid = avoid
    )
}

/// Ask the provider for up to `count` ideas using `pantry`.
///
/// `count` is clamped to 1..=MAX_IDEAS. Ideas without a title, or whose
/// title matches one in `avoid_titles` (ignoring case), are dropped.
pub async fn suggest_recipe_ideas(
    provider: &dyn LlmProvider,
    pantry: &[String],
    avoid_titles: &[String],
    count: usize,
) -> Result<Vec<RecipeIdea>, IdeasError> {
    let pantry: Vec<String> = pantry
        .iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect();
    if pantry.is_empty() {
        return Err(IdeasError::EmptyPantry);
    }

    let count = count.clamp(1, MAX_IDEAS);
    let prompt = render_ideas_prompt(&pantry, avoid_titles, count);
    let response = provider.complete(&prompt).await?;

    let parsed: IdeasResponse = serde_json::from_str(extract_json(&response))
        .map_err(|e| IdeasError::Parse(format!("Failed to parse ideas response: {}", e)))?;

    let ideas: Vec<RecipeIdea> = parsed
        .ideas
        .into_iter()
        .filter(|idea| !idea.title.trim().is_empty())
        .filter(|idea| {
            !avoid_titles
                .iter()
                .any(|t| t.trim().eq_ignore_ascii_case(idea.title.trim()))
        })
        .take(count)
        .collect();

    tracing::debug!(
        requested = count,
        returned = ideas.len(),
        "Generated recipe ideas"
    );

    Ok(ideas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FakeProvider;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    const THREE_IDEAS: &str = r#"{"ideas": [
        {"title": "Shakshuka", "description": "Eggs poached in spiced tomato sauce.", "uses": ["eggs", "tomatoes"]},
        {"title": "Tomato Omelette", "description": "A quick omelette.", "uses": ["eggs"]},
        {"title": "", "description": "Nameless.", "uses": []}
    ]}"#;

    #[test]
    fn test_render_prompt() {
        let prompt = render_ideas_prompt(
            &strings(&["eggs", "tomatoes"]),
            &strings(&["Shakshuka"]),
            3,
        );
        assert!(prompt.contains("eggs, tomatoes"));
        assert!(prompt.contains("do not suggest them: Shakshuka"));
        assert!(prompt.contains("Suggest 3 different dishes"));
    }

    #[tokio::test]
    async fn test_empty_pantry() {
        let provider = FakeProvider::default();
        let result = suggest_recipe_ideas(&provider, &strings(&["  ", ""]), &[], 3).await;
        assert!(matches!(result, Err(IdeasError::EmptyPantry)));
    }

    #[tokio::test]
    async fn test_filters_blank_and_avoided_titles() {
        let provider = FakeProvider::with_response("recipe_ideas", THREE_IDEAS);
        let ideas = suggest_recipe_ideas(
            &provider,
            &strings(&["eggs", "tomatoes"]),
            &strings(&["shakshuka"]),
            5,
        )
        .await
        .unwrap();
        assert_eq!(ideas.len(), 1);
        assert_eq!(ideas[0].title, "Tomato Omelette");
    }

    #[tokio::test]
    async fn test_count_is_clamped() {
        let provider = FakeProvider::with_response("recipe_ideas", THREE_IDEAS);
        let ideas = suggest_recipe_ideas(&provider, &strings(&["eggs"]), &[], 0)
            .await
            .unwrap();
        assert_eq!(ideas.len(), 1);
        assert_eq!(ideas[0].title, "Shakshuka");
    }

    #[tokio::test]
    async fn test_unparseable_reply() {
        let provider = FakeProvider::with_response("recipe_ideas", "no ideas, sorry");
        let result = suggest_recipe_ideas(&provider, &strings(&["eggs"]), &[], 2).await;
        assert!(matches!(result, Err(IdeasError::Parse(_))));
    }
}
