use super::PhotoResponse;
use crate::access::{self, Permission};
use crate::api::{error_response, internal_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::changes::{record_change, ChangeKind};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewPhoto, Photo};
use crate::photos::processing::make_thumbnail;
use crate::schema::recipe_photos;
use crate::storage::{photo_key, thumbnail_key, BlobStore, StorageError, UrlSigner};
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::prelude::*;
use potluck_core::image::extension_for;
use potluck_core::{validate_image, MAX_FILE_SIZE};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadPhotoRequest {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

fn too_large() -> Response {
    error_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        format!(
            "File too large. Maximum size is {} MB",
            MAX_FILE_SIZE / (1024 * 1024)
        ),
    )
}

fn multipart_error(e: MultipartError) -> Response {
    tracing::warn!("Multipart read error: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large()
    } else {
        error_response(
            e.status(),
            format!("Failed to read multipart data: {}", e.body_text()),
        )
    }
}

/// Write the original and its thumbnail, removing the original again if the
/// thumbnail can't be stored.
async fn write_blobs(
    blobs: &dyn BlobStore,
    original: (&str, Vec<u8>, &str),
    thumbnail: (&str, Vec<u8>),
) -> Result<(), StorageError> {
    let (original_key, data, content_type) = original;
    let (thumb_key, thumb) = thumbnail;

    blobs.put(original_key, data, content_type).await?;
    if let Err(e) = blobs.put(thumb_key, thumb, "image/jpeg").await {
        if let Err(cleanup) = blobs.delete(original_key).await {
            tracing::warn!(key = %original_key, "Failed to clean up photo blob: {}", cleanup);
        }
        return Err(e);
    }
    Ok(())
}

async fn remove_blobs(blobs: &dyn BlobStore, keys: &[&str]) {
    for key in keys {
        if let Err(e) = blobs.delete(key).await {
            tracing::warn!(key = %key, "Failed to delete photo blob: {}", e);
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/photos",
    tag = "photos",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body(content_type = "multipart/form-data", content = UploadPhotoRequest),
    responses(
        (status = 201, description = "Photo uploaded successfully", body = PhotoResponse),
        (status = 400, description = "Missing file or unsupported image", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "View-only access", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_photo(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(blobs): State<Arc<dyn BlobStore>>,
    State(signer): State<Arc<UrlSigner>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    {
        let mut conn = get_conn!(pool);
        if let Err(e) = access::require(&mut conn, user.id, id, Permission::Edit) {
            return e.into_response();
        }
    }

    // Find the "file" part, skipping any others
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => break field,
            Ok(Some(_)) => continue,
            Ok(None) => return error_response(StatusCode::BAD_REQUEST, "No file provided"),
            Err(e) => return multipart_error(e),
        }
    };

    let data = match field.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => return multipart_error(e),
    };

    if data.len() > MAX_FILE_SIZE {
        return too_large();
    }
    if data.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "File is empty");
    }

    let content_type = match validate_image(&data) {
        Ok(content_type) => content_type,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let thumb_source = data.clone();
    let thumbnail = match tokio::task::spawn_blocking(move || make_thumbnail(&thumb_source)).await
    {
        Ok(Ok(thumbnail)) => thumbnail,
        Ok(Err(message)) => return error_response(StatusCode::BAD_REQUEST, message),
        Err(e) => return internal_error("Failed to generate thumbnail", e),
    };

    let photo_id = Uuid::new_v4();
    let original_key = photo_key(id, photo_id, extension_for(&content_type));
    let thumb_key = thumbnail_key(id, photo_id);
    let byte_size = data.len() as i64;

    if let Err(e) = write_blobs(
        blobs.as_ref(),
        (&original_key, data.to_vec(), &content_type),
        (&thumb_key, thumbnail),
    )
    .await
    {
        return internal_error("Failed to store photo", e);
    }

    let result = {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                remove_blobs(blobs.as_ref(), &[original_key.as_str(), thumb_key.as_str()]).await;
                return internal_error("Database connection failed", e);
            }
        };

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let max_position: Option<i32> = recipe_photos::table
                .filter(recipe_photos::recipe_id.eq(id))
                .select(diesel::dsl::max(recipe_photos::position))
                .first(conn)?;

            let photo: Photo = diesel::insert_into(recipe_photos::table)
                .values(NewPhoto {
                    id: photo_id,
                    recipe_id: id,
                    uploaded_by: user.id,
                    storage_key: &original_key,
                    thumbnail_key: &thumb_key,
                    content_type: &content_type,
                    byte_size,
                    position: max_position.map_or(0, |p| p + 1),
                })
                .returning(Photo::as_returning())
                .get_result(conn)?;

            record_change(conn, id, user.id, ChangeKind::PhotoAdded, &[], None)?;
            Ok(photo)
        })
    };

    match result {
        Ok(photo) => {
            tracing::info!(recipe_id = %id, photo_id = %photo.id, byte_size, "Uploaded photo");
            (
                StatusCode::CREATED,
                Json(PhotoResponse::from_photo(&photo, &signer)),
            )
                .into_response()
        }
        Err(e) => {
            remove_blobs(blobs.as_ref(), &[original_key.as_str(), thumb_key.as_str()]).await;
            internal_error("Failed to save photo", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Blob, MemoryBlobStore};
    use async_trait::async_trait;

    /// Accepts originals but refuses thumbnails.
    #[derive(Debug, Default)]
    struct NoThumbnails {
        inner: MemoryBlobStore,
    }

    #[async_trait]
    impl BlobStore for NoThumbnails {
        async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
            if key.ends_with("_thumb.jpg") {
                return Err(StorageError::Io(std::io::Error::other("disk full")));
            }
            self.inner.put(key, data, content_type).await
        }

        async fn get(&self, key: &str) -> Result<Blob, StorageError> {
            self.inner.get(key).await
        }

        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            self.inner.delete(key).await
        }
    }

    #[tokio::test]
    async fn test_write_blobs_stores_both() {
        let store = MemoryBlobStore::new();
        write_blobs(
            &store,
            ("recipes/r/p.png", vec![1, 2, 3], "image/png"),
            ("recipes/r/p_thumb.jpg", vec![4, 5]),
        )
        .await
        .unwrap();

        assert_eq!(store.len().await, 2);
        assert_eq!(store.get("recipes/r/p.png").await.unwrap().content_type, "image/png");
        assert_eq!(
            store.get("recipes/r/p_thumb.jpg").await.unwrap().content_type,
            "image/jpeg"
        );
    }

    #[tokio::test]
    async fn test_write_blobs_cleans_up_partial_write() {
        let store = NoThumbnails::default();
        let result = write_blobs(
            &store,
            ("recipes/r/p.png", vec![1, 2, 3], "image/png"),
            ("recipes/r/p_thumb.jpg", vec![4, 5]),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(store.inner.len().await, 0);
    }

    #[tokio::test]
    async fn test_remove_blobs_ignores_missing() {
        let store = MemoryBlobStore::new();
        store.put("recipes/r/a.jpg", vec![1], "image/jpeg").await.unwrap();
        remove_blobs(&store, &["recipes/r/a.jpg", "recipes/r/missing.jpg"]).await;
        assert_eq!(store.len().await, 0);
    }

    #[test]
    fn test_too_large_status() {
        assert_eq!(too_large().status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
