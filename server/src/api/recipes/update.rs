use super::{normalize_content, validate_content};
use crate::access::{self, Permission};
use crate::api::{error_response, internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::changes::{diff_fields, record_change, ChangeKind};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{Recipe, RecipeFields};
use crate::schema::recipes;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use potluck_core::{Ingredient, Nutrition, RecipeContent};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Partial update. Omitted fields are left alone; an explicit null clears an
/// optional field, as does an empty string for description, source_url and
/// notes.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub instructions: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i32>)]
    pub servings: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i32>)]
    pub prep_minutes: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i32>)]
    pub cook_minutes: Option<Option<i32>>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<Nutrition>)]
    pub nutrition: Option<Option<Nutrition>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub source_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

/// Present fields become `Some`, so a JSON null is `Some(None)`.
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateRecipeRequest {
    fn apply_to(self, content: &mut RecipeContent) {
        if let Some(title) = self.title {
            content.title = title;
        }
        if let Some(description) = self.description {
            content.description = description;
        }
        if let Some(ingredients) = self.ingredients {
            content.ingredients = ingredients;
        }
        if let Some(instructions) = self.instructions {
            content.instructions = instructions;
        }
        if let Some(servings) = self.servings {
            content.servings = servings;
        }
        if let Some(prep_minutes) = self.prep_minutes {
            content.prep_minutes = prep_minutes;
        }
        if let Some(cook_minutes) = self.cook_minutes {
            content.cook_minutes = cook_minutes;
        }
        if let Some(tags) = self.tags {
            content.tags = tags;
        }
        if let Some(nutrition) = self.nutrition {
            content.nutrition = nutrition;
        }
        if let Some(source_url) = self.source_url {
            content.source_url = source_url;
        }
        if let Some(notes) = self.notes {
            content.notes = notes;
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UpdateRecipeResponse {
    /// Fields whose value changed; empty when the update was a no-op
    pub changed_fields: Vec<String>,
}

#[utoipa::path(
    put,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated successfully", body = UpdateRecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "View-only access", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRecipeRequest>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    if let Err(e) = access::require(&mut conn, user.id, id, Permission::Edit) {
        return e.into_response();
    }

    let recipe: Recipe = match recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(&mut conn)
    {
        Ok(recipe) => recipe,
        Err(e) => return internal_error("Failed to fetch recipe", e),
    };

    let before = match recipe.content() {
        Ok(content) => content,
        Err(e) => return internal_error("Failed to decode recipe", e),
    };
    let mut after = before.clone();
    request.apply_to(&mut after);
    normalize_content(&mut after);

    if let Err(message) = validate_content(&after) {
        return error_response(StatusCode::BAD_REQUEST, message);
    }

    let changed = diff_fields(&before, &after);
    if changed.is_empty() {
        return (
            StatusCode::OK,
            Json(UpdateRecipeResponse {
                changed_fields: Vec::new(),
            }),
        )
            .into_response();
    }

    let fields = match RecipeFields::from_content(&after) {
        Ok(fields) => fields,
        Err(e) => return internal_error("Failed to encode recipe", e),
    };

    let result = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let updated = diesel::update(
            recipes::table
                .filter(recipes::id.eq(id))
                .filter(recipes::deleted_at.is_null()),
        )
        .set((fields, recipes::updated_at.eq(diesel::dsl::now)))
        .execute(conn)?;

        if updated == 0 {
            return Err(diesel::result::Error::NotFound);
        }

        record_change(conn, id, user.id, ChangeKind::Updated, &changed, None)?;
        Ok(())
    });

    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(UpdateRecipeResponse {
                changed_fields: changed.iter().map(|f| f.to_string()).collect(),
            }),
        )
            .into_response(),
        // Deleted between the access check and the write
        Err(diesel::result::Error::NotFound) => {
            error_response(StatusCode::NOT_FOUND, "Recipe not found")
        }
        Err(e) => internal_error("Failed to update recipe", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> RecipeContent {
        RecipeContent {
            title: "Granola".to_string(),
            description: Some("Crunchy.".to_string()),
            instructions: "Bake.".to_string(),
            servings: Some(8),
            tags: vec!["breakfast".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_absent_fields_unchanged() {
        let mut after = content();
        UpdateRecipeRequest::default().apply_to(&mut after);
        assert_eq!(after, content());
    }

    #[test]
    fn test_null_clears_optional_fields() {
        let mut before = content();
        before.prep_minutes = Some(10);
        before.nutrition = Some(Nutrition {
            calories: Some(250.0),
            ..Default::default()
        });

        let request: UpdateRecipeRequest = serde_json::from_str(
            r#"{"servings": null, "nutrition": null, "description": null}"#,
        )
        .unwrap();
        let mut after = before.clone();
        request.apply_to(&mut after);

        assert_eq!(after.servings, None);
        assert_eq!(after.nutrition, None);
        assert_eq!(after.description, None);
        assert_eq!(after.prep_minutes, Some(10));
        assert_eq!(
            diff_fields(&before, &after),
            vec!["description", "servings", "nutrition"]
        );
    }

    #[test]
    fn test_present_value_sets_field() {
        let request: UpdateRecipeRequest =
            serde_json::from_str(r#"{"cook_minutes": 45}"#).unwrap();
        assert_eq!(request.cook_minutes, Some(Some(45)));
        assert_eq!(request.servings, None);

        let mut after = content();
        request.apply_to(&mut after);
        assert_eq!(after.cook_minutes, Some(45));
        assert_eq!(after.servings, Some(8));
    }

    #[test]
    fn test_empty_string_clears_after_normalize() {
        let request: UpdateRecipeRequest =
            serde_json::from_str(r#"{"description": ""}"#).unwrap();
        let mut after = content();
        request.apply_to(&mut after);
        normalize_content(&mut after);
        assert_eq!(after.description, None);
        assert_eq!(diff_fields(&content(), &after), vec!["description"]);
    }

    #[test]
    fn test_replaces_lists() {
        let request: UpdateRecipeRequest =
            serde_json::from_str(r#"{"tags": ["snack"], "title": "Bars"}"#).unwrap();
        let mut after = content();
        request.apply_to(&mut after);
        assert_eq!(after.tags, vec!["snack"]);
        assert_eq!(after.title, "Bars");
    }
}
