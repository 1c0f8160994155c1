use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use axum::{http::StatusCode, response::IntoResponse, Json};
use potluck_core::Ingredient;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ParseIngredientsRequest {
    /// One ingredient per line
    pub text: String,
}

/// Parse pasted ingredient lines into structured ingredients
#[utoipa::path(
    post,
    path = "/api/ingredients/parse",
    tag = "ingredients",
    request_body = ParseIngredientsRequest,
    responses(
        (status = 200, description = "Parsed ingredients, blank lines skipped", body = Vec<Ingredient>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn parse_ingredients(
    AuthUser(_user): AuthUser,
    Json(request): Json<ParseIngredientsRequest>,
) -> impl IntoResponse {
    let ingredients = potluck_core::parse_ingredients(&request.text);
    (StatusCode::OK, Json(ingredients)).into_response()
}
