use serde::{Deserialize, Serialize};

/// One ingredient line, stored as JSONB on the recipe row.
///
/// `amount` keeps the text the cook wrote ("1 1/2", "2-3") so that
/// scaling can round-trip it without losing ranges.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Ingredient {
    pub item: String,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl Ingredient {
    pub fn new(item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            ..Default::default()
        }
    }

    pub fn with_amount(mut self, amount: impl Into<String>, unit: Option<&str>) -> Self {
        self.amount = Some(amount.into());
        self.unit = unit.map(str::to_string);
        self
    }

    /// Render back to a single human-readable line.
    pub fn display(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(amount) = self.amount.as_deref().filter(|a| !a.is_empty()) {
            parts.push(amount);
        }
        if let Some(unit) = self.unit.as_deref().filter(|u| !u.is_empty()) {
            parts.push(unit);
        }
        if !self.item.is_empty() {
            parts.push(&self.item);
        }
        let line = parts.join(" ");
        match self.note.as_deref().filter(|n| !n.is_empty()) {
            Some(note) => format!("{}, {}", line, note),
            None => line,
        }
    }
}

/// Estimated nutrition facts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Nutrition {
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub protein_g: Option<f64>,
    #[serde(default)]
    pub carbohydrates_g: Option<f64>,
    #[serde(default)]
    pub fat_g: Option<f64>,
    #[serde(default)]
    pub fiber_g: Option<f64>,
    #[serde(default)]
    pub sugar_g: Option<f64>,
    #[serde(default)]
    pub sodium_mg: Option<f64>,
    /// True when the values are per serving rather than for the whole recipe.
    #[serde(default = "default_per_serving")]
    pub per_serving: bool,
}

fn default_per_serving() -> bool {
    true
}

impl Nutrition {
    pub fn values(&self) -> [Option<f64>; 7] {
        [
            self.calories,
            self.protein_g,
            self.carbohydrates_g,
            self.fat_g,
            self.fiber_g,
            self.sugar_g,
            self.sodium_mg,
        ]
    }
}

/// Core recipe content - all fields that can be enriched by AI.
/// Used for: enrich API request/response, and as the editable part of a recipe.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecipeContent {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub servings: Option<i32>,
    #[serde(default)]
    pub prep_minutes: Option<i32>,
    #[serde(default)]
    pub cook_minutes: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub nutrition: Option<Nutrition>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RecipeContent {
    /// Ingredient lines joined for prompts.
    pub fn ingredients_text(&self) -> String {
        self.ingredients
            .iter()
            .map(|i| format!("- {}", i.display()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A recipe idea suggested from what the cook has on hand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecipeIdea {
    pub title: String,
    pub description: String,
    /// Pantry ingredients this idea uses.
    #[serde(default)]
    pub uses: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_full() {
        let ingredient = Ingredient {
            item: "butter".to_string(),
            amount: Some("1/2".to_string()),
            unit: Some("cup".to_string()),
            note: Some("softened".to_string()),
        };
        assert_eq!(ingredient.display(), "1/2 cup butter, softened");
    }

    #[test]
    fn test_display_item_only() {
        assert_eq!(Ingredient::new("salt to taste").display(), "salt to taste");
    }

    #[test]
    fn test_nutrition_defaults_per_serving() {
        let nutrition: Nutrition = serde_json::from_str(r#"{"calories": 320}"#).unwrap();
        assert!(nutrition.per_serving);
        assert_eq!(nutrition.calories, Some(320.0));
        assert_eq!(nutrition.fat_g, None);
    }

    #[test]
    fn test_recipe_content_minimal_json() {
        let content: RecipeContent = serde_json::from_str(r#"{"title": "Toast"}"#).unwrap();
        assert_eq!(content.title, "Toast");
        assert!(content.ingredients.is_empty());
        assert!(content.tags.is_empty());
    }
}
