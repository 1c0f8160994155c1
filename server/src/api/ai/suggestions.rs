use crate::api::{error_response, internal_error, llm_error_response, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::recipes;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use potluck_core::llm::LlmProvider;
use potluck_core::{suggest_recipe_ideas, IdeasError, RecipeIdea};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

const DEFAULT_IDEAS: usize = 5;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SuggestionsRequest {
    /// What the cook has on hand
    pub ingredients: Vec<String>,
    /// How many ideas to ask for (default 5, at most 10)
    pub count: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuggestionsResponse {
    pub ideas: Vec<RecipeIdea>,
}

/// Suggest recipes to make from a list of ingredients
///
/// Titles of the caller's own recipes are passed along so the ideas are new.
#[utoipa::path(
    post,
    path = "/api/ai/suggestions",
    tag = "ai",
    request_body = SuggestionsRequest,
    responses(
        (status = 200, description = "Recipe ideas", body = SuggestionsResponse),
        (status = 400, description = "No ingredients given", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "AI reply could not be used", body = ErrorResponse),
        (status = 429, description = "AI service rate limited", body = ErrorResponse),
        (status = 502, description = "AI service error", body = ErrorResponse),
        (status = 503, description = "AI service unavailable", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn suggest_recipes(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(provider): State<Arc<dyn LlmProvider>>,
    Json(request): Json<SuggestionsRequest>,
) -> impl IntoResponse {
    if request.ingredients.iter().all(|i| i.trim().is_empty()) {
        return error_response(StatusCode::BAD_REQUEST, "No ingredients given");
    }

    let owned_titles: Vec<String> = {
        let mut conn = get_conn!(pool);
        match recipes::table
            .filter(recipes::owner_id.eq(user.id))
            .filter(recipes::deleted_at.is_null())
            .order(recipes::updated_at.desc())
            .select(recipes::title)
            .load(&mut conn)
        {
            Ok(titles) => titles,
            Err(e) => return internal_error("Failed to fetch recipe titles", e),
        }
    };

    let count = request.count.unwrap_or(DEFAULT_IDEAS);
    match suggest_recipe_ideas(
        provider.as_ref(),
        &request.ingredients,
        &owned_titles,
        count,
    )
    .await
    {
        Ok(ideas) => (StatusCode::OK, Json(SuggestionsResponse { ideas })).into_response(),
        Err(IdeasError::EmptyPantry) => {
            error_response(StatusCode::BAD_REQUEST, "No ingredients given")
        }
        Err(IdeasError::Llm(e)) => llm_error_response(&e),
        Err(e @ IdeasError::Parse(_)) => {
            tracing::warn!("{}", e);
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
    }
}
