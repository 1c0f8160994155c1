pub mod delete;
pub mod list;
pub mod upload;

use crate::models::Photo;
use crate::storage::UrlSigner;
use crate::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get};
use axum::Router;
use chrono::{DateTime, Utc};
use potluck_core::MAX_FILE_SIZE;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

/// Room for multipart framing around a maximum-size file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Returns the photo routes, merged into the /api/recipes router
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}/photos",
            get(list::list_photos).post(upload::upload_photo),
        )
        .route("/{id}/photos/{photo_id}", delete(delete::delete_photo))
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + MULTIPART_OVERHEAD))
}

#[derive(OpenApi)]
#[openapi(
    paths(upload::upload_photo, list::list_photos, delete::delete_photo),
    components(schemas(upload::UploadPhotoRequest, list::ListPhotosResponse, PhotoResponse))
)]
pub struct ApiDoc;

/// A recipe photo with signed links to the original and its thumbnail.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PhotoResponse {
    pub id: Uuid,
    pub url: String,
    pub thumbnail_url: String,
    pub content_type: String,
    pub byte_size: i64,
    pub position: i32,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl PhotoResponse {
    pub fn from_photo(photo: &Photo, signer: &UrlSigner) -> Self {
        Self {
            id: photo.id,
            url: signer.signed_url(&photo.storage_key),
            thumbnail_url: signer.signed_url(&photo.thumbnail_key),
            content_type: photo.content_type.clone(),
            byte_size: photo.byte_size,
            position: photo.position,
            uploaded_by: photo.uploaded_by,
            created_at: photo.created_at,
        }
    }
}
