pub mod changes;
pub mod copy;
pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod scaled;
pub mod tags;
pub mod update;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use potluck_core::RecipeContent;
use utoipa::OpenApi;

const MAX_TITLE_CHARS: usize = 200;
const MAX_SOURCE_URL_CHARS: usize = 2048;
const MAX_TAG_CHARS: usize = 50;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route("/tags", get(tags::list_tags))
        .route(
            "/{id}",
            get(get::get_recipe)
                .put(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route("/{id}/copy", post(copy::copy_recipe))
        .route("/{id}/changes", get(changes::list_changes))
        .route("/{id}/scaled", get(scaled::get_scaled))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_recipes,
        create::create_recipe,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
        copy::copy_recipe,
        changes::list_changes,
        scaled::get_scaled,
        tags::list_tags,
    ),
    components(schemas(
        list::Scope,
        list::ListRecipesResponse,
        list::RecipeSummary,
        list::PaginationMetadata,
        create::CreateRecipeResponse,
        get::RecipeResponse,
        update::UpdateRecipeRequest,
        update::UpdateRecipeResponse,
        changes::ChangeResponse,
        changes::ListChangesResponse,
        scaled::ScaledRecipeResponse,
        tags::TagsResponse,
        crate::access::AccessLevel,
        crate::changes::ChangeKind,
        potluck_core::RecipeContent,
        potluck_core::Ingredient,
        potluck_core::Nutrition,
        potluck_core::System,
    ))
)]
pub struct ApiDoc;

/// Trim free text and drop blank optional fields and duplicate tags.
pub(crate) fn normalize_content(content: &mut RecipeContent) {
    content.title = content.title.trim().to_string();
    content.instructions = content.instructions.trim().to_string();

    for field in [
        &mut content.description,
        &mut content.source_url,
        &mut content.notes,
    ] {
        *field = field
            .take()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
    }

    for ingredient in &mut content.ingredients {
        ingredient.item = ingredient.item.trim().to_string();
        for part in [
            &mut ingredient.amount,
            &mut ingredient.unit,
            &mut ingredient.note,
        ] {
            *part = part
                .take()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
        }
    }

    let mut tags: Vec<String> = Vec::with_capacity(content.tags.len());
    for tag in content.tags.drain(..) {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
            tags.push(tag);
        }
    }
    content.tags = tags;
}

/// Check a normalized recipe before it is written.
pub(crate) fn validate_content(content: &RecipeContent) -> Result<(), String> {
    if content.title.is_empty() {
        return Err("Title is required".to_string());
    }
    if content.title.chars().count() > MAX_TITLE_CHARS {
        return Err(format!(
            "Title must be at most {} characters",
            MAX_TITLE_CHARS
        ));
    }
    if content.ingredients.is_empty() && content.instructions.is_empty() {
        return Err("A recipe needs ingredients or instructions".to_string());
    }
    if content.ingredients.iter().any(|i| i.item.is_empty()) {
        return Err("Every ingredient needs an item".to_string());
    }
    if content.servings.is_some_and(|s| s <= 0) {
        return Err("Servings must be greater than 0".to_string());
    }
    if content.prep_minutes.is_some_and(|m| m < 0) || content.cook_minutes.is_some_and(|m| m < 0)
    {
        return Err("Times cannot be negative".to_string());
    }
    if content
        .source_url
        .as_ref()
        .is_some_and(|u| u.chars().count() > MAX_SOURCE_URL_CHARS)
    {
        return Err("Source URL is too long".to_string());
    }
    if content
        .tags
        .iter()
        .any(|t| t.chars().count() > MAX_TAG_CHARS)
    {
        return Err(format!("Tags must be at most {} characters", MAX_TAG_CHARS));
    }
    Ok(())
}
