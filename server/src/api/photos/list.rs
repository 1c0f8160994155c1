use super::PhotoResponse;
use crate::access::{self, Permission};
use crate::api::{internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Photo;
use crate::schema::recipe_photos;
use crate::storage::UrlSigner;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListPhotosResponse {
    pub photos: Vec<PhotoResponse>,
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/photos",
    tag = "photos",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Photos in display order", body = ListPhotosResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_photos(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(signer): State<Arc<UrlSigner>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    if let Err(e) = access::require(&mut conn, user.id, id, Permission::View) {
        return e.into_response();
    }

    let photos: Vec<Photo> = match recipe_photos::table
        .filter(recipe_photos::recipe_id.eq(id))
        .order((recipe_photos::position.asc(), recipe_photos::created_at.asc()))
        .select(Photo::as_select())
        .load(&mut conn)
    {
        Ok(photos) => photos,
        Err(e) => return internal_error("Failed to fetch photos", e),
    };

    let photos = photos
        .iter()
        .map(|photo| PhotoResponse::from_photo(photo, &signer))
        .collect();

    (StatusCode::OK, Json(ListPhotosResponse { photos })).into_response()
}
