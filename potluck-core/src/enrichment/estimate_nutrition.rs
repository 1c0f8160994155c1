//! EstimateNutrition enrichment.
//!
//! Estimates per-serving nutrition facts from the ingredient list.

use super::{parse_reply, recipe_summary, Enrichment, EnrichmentError};
use crate::types::{Nutrition, RecipeContent};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Clone, Copy)]
pub struct EstimateNutrition;

#[derive(Debug, Deserialize)]
struct NutritionResponse {
    calories: Option<f64>,
    protein_g: Option<f64>,
    carbohydrates_g: Option<f64>,
    fat_g: Option<f64>,
    fiber_g: Option<f64>,
    sugar_g: Option<f64>,
    sodium_mg: Option<f64>,
}

impl From<NutritionResponse> for Nutrition {
    fn from(r: NutritionResponse) -> Self {
        Nutrition {
            calories: r.calories,
            protein_g: r.protein_g,
            carbohydrates_g: r.carbohydrates_g,
            fat_g: r.fat_g,
            fiber_g: r.fiber_g,
            sugar_g: r.sugar_g,
            sodium_mg: r.sodium_mg,
            per_serving: true,
        }
    }
}

fn validate(nutrition: &Nutrition) -> Result<(), EnrichmentError> {
    let values = nutrition.values();
    if values.iter().all(Option::is_none) {
        return Err(EnrichmentError::Validation(
            "No nutrition values returned".to_string(),
        ));
    }
    if values
        .iter()
        .flatten()
        .any(|v| !v.is_finite() || *v < 0.0)
    {
        return Err(EnrichmentError::Validation(
            "Nutrition values must be non-negative numbers".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl Enrichment for EstimateNutrition {
    fn enrichment_type(&self) -> &'static str {
        "estimate_nutrition"
    }

    fn display_name(&self) -> &'static str {
        "Estimate Nutrition"
    }

    fn description(&self) -> &'static str {
        "Estimate nutritional information per serving based on ingredients"
    }

    fn output_fields(&self) -> &'static [&'static str] {
        &["nutrition"]
    }

    fn build_prompt(&self, recipe: &RecipeContent) -> String {
        let servings = recipe
            .servings
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown (assume 4)".to_string());

        format!(
            r#"TASK: estimate_nutrition

You are a nutritionist. Estimate the nutrition facts for ONE serving of this recipe. Servings: {servings}. Use typical values for the ingredients as listed. Use null for anything you cannot estimate.

{summary}
Respond with JSON only, no other text: {{"calories": 0, "protein_g": 0, "carbohydrates_g": 0, "fat_g": 0, "fiber_g": 0, "sugar_g": 0, "sodium_mg": 0}}"#,
            servings = servings,
            summary = recipe_summary(recipe)
        )
    }

    fn apply_response(
        &self,
        original: &RecipeContent,
        response: &str,
    ) -> Result<RecipeContent, EnrichmentError> {
        let parsed: NutritionResponse = parse_reply(response)?;
        let nutrition = Nutrition::from(parsed);
        validate(&nutrition)?;

        let mut enriched = original.clone();
        enriched.nutrition = Some(nutrition);
        Ok(enriched)
    }
}
