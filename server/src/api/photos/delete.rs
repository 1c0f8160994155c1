use crate::access::{self, Permission};
use crate::api::{error_response, internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::changes::{record_change, ChangeKind};
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::recipe_photos;
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
    path = "/api/recipes/{id}/photos/{photo_id}",
    tag = "photos",
    params(
        ("id" = Uuid, Path, description = "Recipe ID"),
        ("photo_id" = Uuid, Path, description = "Photo ID")
    ),
    responses(
        (status = 204, description = "Photo deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "View-only access", body = ErrorResponse),
        (status = 404, description = "Recipe or photo not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_photo(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(blobs): State<Arc<dyn BlobStore>>,
    Path((id, photo_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let keys = {
        let mut conn = get_conn!(pool);

        if let Err(e) = access::require(&mut conn, user.id, id, Permission::Edit) {
            return e.into_response();
        }

        let result = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let keys: (String, String) = diesel::delete(
                recipe_photos::table
                    .filter(recipe_photos::id.eq(photo_id))
                    .filter(recipe_photos::recipe_id.eq(id)),
            )
            .returning((recipe_photos::storage_key, recipe_photos::thumbnail_key))
            .get_result(conn)?;

            record_change(conn, id, user.id, ChangeKind::PhotoRemoved, &[], None)?;
            Ok(keys)
        });

        match result {
            Ok(keys) => keys,
            Err(diesel::result::Error::NotFound) => {
                return error_response(StatusCode::NOT_FOUND, "Photo not found")
            }
            Err(e) => return internal_error("Failed to delete photo", e),
        }
    };

    let (storage_key, thumbnail_key) = keys;
    for key in [&storage_key, &thumbnail_key] {
        if let Err(e) = blobs.delete(key).await {
            tracing::warn!(photo_id = %photo_id, key = %key, "Failed to delete photo blob: {}", e);
        }
    }

    StatusCode::NO_CONTENT.into_response()
}
