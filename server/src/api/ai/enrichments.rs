use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use axum::{http::StatusCode, response::IntoResponse, Json};
use potluck_core::enrichment::{all_enrichment_info, EnrichmentInfo};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct EnrichmentsResponse {
    pub enrichments: Vec<EnrichmentInfo>,
}

/// List the enrichment types `POST /api/ai/enrich` accepts
#[utoipa::path(
    get,
    path = "/api/ai/enrichments",
    tag = "ai",
    responses(
        (status = 200, description = "Available enrichments", body = EnrichmentsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_enrichments(AuthUser(_user): AuthUser) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(EnrichmentsResponse {
            enrichments: all_enrichment_info(),
        }),
    )
        .into_response()
}
