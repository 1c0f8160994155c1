use super::{normalize_content, validate_content};
use crate::api::{error_response, internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::changes::{record_change, ChangeKind};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewRecipe, RecipeFields};
use crate::schema::recipes;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use potluck_core::RecipeContent;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateRecipeResponse {
    pub id: Uuid,
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = RecipeContent,
    responses(
        (status = 201, description = "Recipe created successfully", body = CreateRecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(mut content): Json<RecipeContent>,
) -> impl IntoResponse {
    normalize_content(&mut content);
    if let Err(message) = validate_content(&content) {
        return error_response(StatusCode::BAD_REQUEST, message);
    }

    let fields = match RecipeFields::from_content(&content) {
        Ok(fields) => fields,
        Err(e) => return internal_error("Failed to encode recipe", e),
    };

    let mut conn = get_conn!(pool);

    let result = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let recipe_id: Uuid = diesel::insert_into(recipes::table)
            .values(NewRecipe {
                owner_id: user.id,
                fields,
            })
            .returning(recipes::id)
            .get_result(conn)?;

        record_change(conn, recipe_id, user.id, ChangeKind::Created, &[], None)?;
        Ok(recipe_id)
    });

    match result {
        Ok(id) => {
            tracing::info!(recipe_id = %id, "Created recipe");
            (StatusCode::CREATED, Json(CreateRecipeResponse { id })).into_response()
        }
        Err(e) => internal_error("Failed to create recipe", e),
    }
}
