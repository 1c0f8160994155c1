use crate::access::{self, AccessLevel, Permission};
use crate::api::photos::PhotoResponse;
use crate::api::{internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{Photo, Recipe};
use crate::schema::{recipe_photos, recipes};
use crate::storage::UrlSigner;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use potluck_core::RecipeContent;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[serde(flatten)]
    pub content: RecipeContent,
    /// The caller's access to this recipe
    pub access: AccessLevel,
    pub photos: Vec<PhotoResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = RecipeResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(signer): State<Arc<UrlSigner>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let access = match access::require(&mut conn, user.id, id, Permission::View) {
        Ok(access) => access,
        Err(e) => return e.into_response(),
    };

    let recipe: Recipe = match recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(&mut conn)
    {
        Ok(recipe) => recipe,
        Err(e) => return internal_error("Failed to fetch recipe", e),
    };

    let photos: Vec<Photo> = match recipe_photos::table
        .filter(recipe_photos::recipe_id.eq(id))
        .order((recipe_photos::position.asc(), recipe_photos::created_at.asc()))
        .select(Photo::as_select())
        .load(&mut conn)
    {
        Ok(photos) => photos,
        Err(e) => return internal_error("Failed to fetch photos", e),
    };

    let content = match recipe.content() {
        Ok(content) => content,
        Err(e) => return internal_error("Failed to decode recipe", e),
    };

    let response = RecipeResponse {
        id: recipe.id,
        owner_id: recipe.owner_id,
        content,
        access: access.level(),
        photos: photos
            .iter()
            .map(|photo| PhotoResponse::from_photo(photo, &signer))
            .collect(),
        created_at: recipe.created_at,
        updated_at: recipe.updated_at,
    };

    (StatusCode::OK, Json(response)).into_response()
}
