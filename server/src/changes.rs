//! Recipe change log.
//!
//! Every mutation writes one `recipe_changes` row inside the same
//! transaction as the mutation itself.

use crate::models::NewRecipeChange;
use crate::schema::recipe_changes;
use diesel::prelude::*;
use potluck_core::RecipeContent;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Copied,
    PhotoAdded,
    PhotoRemoved,
    Shared,
    Unshared,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Created => "created",
            ChangeKind::Updated => "updated",
            ChangeKind::Copied => "copied",
            ChangeKind::PhotoAdded => "photo_added",
            ChangeKind::PhotoRemoved => "photo_removed",
            ChangeKind::Shared => "shared",
            ChangeKind::Unshared => "unshared",
            ChangeKind::Deleted => "deleted",
        }
    }
}

/// Names of the content fields that differ between two versions of a recipe.
pub fn diff_fields(before: &RecipeContent, after: &RecipeContent) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if before.title != after.title {
        fields.push("title");
    }
    if before.description != after.description {
        fields.push("description");
    }
    if before.ingredients != after.ingredients {
        fields.push("ingredients");
    }
    if before.instructions != after.instructions {
        fields.push("instructions");
    }
    if before.servings != after.servings {
        fields.push("servings");
    }
    if before.prep_minutes != after.prep_minutes {
        fields.push("prep_minutes");
    }
    if before.cook_minutes != after.cook_minutes {
        fields.push("cook_minutes");
    }
    if before.tags != after.tags {
        fields.push("tags");
    }
    if before.nutrition != after.nutrition {
        fields.push("nutrition");
    }
    if before.source_url != after.source_url {
        fields.push("source_url");
    }
    if before.notes != after.notes {
        fields.push("notes");
    }
    fields
}

pub fn record_change(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    user_id: Uuid,
    kind: ChangeKind,
    fields: &[&str],
    summary: Option<&str>,
) -> QueryResult<()> {
    let change = NewRecipeChange {
        recipe_id,
        user_id,
        kind: kind.as_str(),
        changed_fields: fields.iter().map(|f| Some(f.to_string())).collect(),
        summary,
    };

    diesel::insert_into(recipe_changes::table)
        .values(&change)
        .execute(conn)?;

    tracing::debug!(%recipe_id, kind = kind.as_str(), "Recorded recipe change");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use potluck_core::Ingredient;

    fn recipe() -> RecipeContent {
        RecipeContent {
            title: "Chili".to_string(),
            ingredients: vec![Ingredient::new("beans").with_amount("2", Some("cans"))],
            instructions: "Simmer.".to_string(),
            tags: vec!["dinner".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_no_changes() {
        assert!(diff_fields(&recipe(), &recipe()).is_empty());
    }

    #[test]
    fn test_changed_fields_in_order() {
        let before = recipe();
        let mut after = recipe();
        after.title = "Five-Alarm Chili".to_string();
        after.tags.push("spicy".to_string());
        after.servings = Some(6);
        assert_eq!(diff_fields(&before, &after), vec!["title", "servings", "tags"]);
    }

    #[test]
    fn test_ingredient_edit_detected() {
        let before = recipe();
        let mut after = recipe();
        after.ingredients[0].amount = Some("3".to_string());
        assert_eq!(diff_fields(&before, &after), vec!["ingredients"]);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ChangeKind::PhotoAdded.as_str(), "photo_added");
        assert_eq!(
            serde_json::to_value(ChangeKind::PhotoRemoved).unwrap(),
            "photo_removed"
        );
    }
}
