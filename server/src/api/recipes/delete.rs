use crate::access;
use crate::api::{error_response, internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::changes::{record_change, ChangeKind};
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::{recipe_photos, recipes};
use crate::storage::BlobStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Recipe deleted successfully"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Only the owner can delete a recipe", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(blobs): State<Arc<dyn BlobStore>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    if let Err(e) = access::require_owner(&mut conn, user.id, id) {
        return e.into_response();
    }

    // Soft delete the recipe; photo rows go now, their blobs after commit.
    let result = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let deleted = diesel::update(
            recipes::table
                .filter(recipes::id.eq(id))
                .filter(recipes::deleted_at.is_null()),
        )
        .set(recipes::deleted_at.eq(diesel::dsl::now))
        .execute(conn)?;

        if deleted == 0 {
            return Err(diesel::result::Error::NotFound);
        }

        let keys: Vec<(String, String)> =
            diesel::delete(recipe_photos::table.filter(recipe_photos::recipe_id.eq(id)))
                .returning((recipe_photos::storage_key, recipe_photos::thumbnail_key))
                .get_results(conn)?;

        record_change(conn, id, user.id, ChangeKind::Deleted, &[], None)?;
        Ok(keys)
    });

    let keys = match result {
        Ok(keys) => keys,
        Err(diesel::result::Error::NotFound) => {
            return error_response(StatusCode::NOT_FOUND, "Recipe not found")
        }
        Err(e) => return internal_error("Failed to delete recipe", e),
    };
    drop(conn);

    for (storage_key, thumbnail_key) in &keys {
        for key in [storage_key, thumbnail_key] {
            if let Err(e) = blobs.delete(key).await {
                tracing::warn!(recipe_id = %id, key = %key, "Failed to delete photo blob: {}", e);
            }
        }
    }

    tracing::info!(recipe_id = %id, photos = keys.len(), "Deleted recipe");
    StatusCode::NO_CONTENT.into_response()
}
