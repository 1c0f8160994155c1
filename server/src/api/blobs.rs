use crate::api::{error_response, internal_error, ErrorResponse};
use crate::storage::{BlobStore, StorageError, UrlSigner};
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};

/// Returns the public blob route (mounted at /api/blobs)
pub fn router() -> Router<AppState> {
    Router::new().route("/{*key}", get(get_blob))
}

#[derive(OpenApi)]
#[openapi(paths(get_blob))]
pub struct ApiDoc;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SignedParams {
    /// Unix time after which the link stops working
    pub expires: i64,
    /// Hex HMAC issued by the server
    pub signature: String,
}

/// Serve a stored photo through a signed link. No bearer token needed.
#[utoipa::path(
    get,
    path = "/api/blobs/{key}",
    tag = "blobs",
    params(
        ("key" = String, Path, description = "Blob key"),
        SignedParams
    ),
    responses(
        (status = 200, description = "Blob contents", content_type = "application/octet-stream"),
        (status = 400, description = "Missing or malformed link parameters", body = ErrorResponse),
        (status = 403, description = "Bad or expired signature", body = ErrorResponse),
        (status = 404, description = "Blob not found", body = ErrorResponse)
    )
)]
pub async fn get_blob(
    State(blobs): State<Arc<dyn BlobStore>>,
    State(signer): State<Arc<UrlSigner>>,
    Path(key): Path<String>,
    params: Result<Query<SignedParams>, QueryRejection>,
) -> impl IntoResponse {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => {
            tracing::debug!(%key, "Bad blob link: {}", rejection);
            return error_response(
                StatusCode::BAD_REQUEST,
                "Link needs numeric expires and a signature",
            );
        }
    };
    let now = chrono::Utc::now().timestamp();
    if !signer.verify(&key, params.expires, &params.signature, now) {
        return error_response(StatusCode::FORBIDDEN, "Invalid or expired link");
    }

    match blobs.get(&key).await {
        Ok(blob) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, blob.content_type),
                (header::CACHE_CONTROL, "private, max-age=3600".to_string()),
            ],
            blob.data,
        )
            .into_response(),
        Err(StorageError::NotFound(_)) | Err(StorageError::InvalidKey(_)) => {
            error_response(StatusCode::NOT_FOUND, "Blob not found")
        }
        Err(e) => internal_error("Failed to read blob", e),
    }
}
