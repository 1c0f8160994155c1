use crate::api::{error_response, llm_error_response, ErrorResponse};
use crate::auth::AuthUser;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use potluck_core::enrichment::{get_enrichment, EnrichmentError};
use potluck_core::llm::LlmProvider;
use potluck_core::RecipeContent;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct EnrichRequest {
    /// Enrichment type, as listed by `GET /api/ai/enrichments`
    #[serde(rename = "type")]
    pub enrichment_type: String,
    pub recipe: RecipeContent,
}

/// Enrich a recipe using AI
///
/// Stateless: takes recipe content and returns the enriched version without
/// touching the database. The client applies the result with
/// `PUT /api/recipes/{id}`.
#[utoipa::path(
    post,
    path = "/api/ai/enrich",
    tag = "ai",
    request_body = EnrichRequest,
    responses(
        (status = 200, description = "Enriched recipe content", body = RecipeContent),
        (status = 400, description = "Unknown enrichment type", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "AI reply could not be used", body = ErrorResponse),
        (status = 429, description = "AI service rate limited", body = ErrorResponse),
        (status = 502, description = "AI service error", body = ErrorResponse),
        (status = 503, description = "AI service unavailable", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn enrich_recipe(
    AuthUser(user): AuthUser,
    State(provider): State<Arc<dyn LlmProvider>>,
    Json(request): Json<EnrichRequest>,
) -> impl IntoResponse {
    let Some(enrichment) = get_enrichment(&request.enrichment_type) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Unknown enrichment type: {}", request.enrichment_type),
        );
    };

    match enrichment.run(provider.as_ref(), &request.recipe).await {
        Ok(enriched) => {
            tracing::info!(
                user_id = %user.id,
                enrichment = enrichment.enrichment_type(),
                "Enriched recipe"
            );
            (StatusCode::OK, Json(enriched)).into_response()
        }
        Err(EnrichmentError::Llm(e)) => llm_error_response(&e),
        Err(e @ (EnrichmentError::Parse(_) | EnrichmentError::Validation(_))) => {
            tracing::warn!(enrichment = enrichment.enrichment_type(), "{}", e);
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Profile;
    use axum::body::to_bytes;
    use axum::response::Response;
    use potluck_core::llm::FakeProvider;
    use uuid::Uuid;

    fn caller() -> AuthUser {
        AuthUser(Profile {
            id: Uuid::new_v4(),
            email: "cook@example.com".to_string(),
            display_name: None,
            created_at: chrono::Utc::now(),
        })
    }

    fn recipe() -> RecipeContent {
        RecipeContent {
            title: "Tomato Soup".to_string(),
            instructions: "Simmer and blend.".to_string(),
            ..Default::default()
        }
    }

    async fn enrich(provider: FakeProvider, enrichment_type: &str) -> Response {
        let provider: Arc<dyn LlmProvider> = Arc::new(provider);
        enrich_recipe(
            caller(),
            State(provider),
            Json(EnrichRequest {
                enrichment_type: enrichment_type.to_string(),
                recipe: recipe(),
            }),
        )
        .await
        .into_response()
    }

    #[tokio::test]
    async fn test_enrich_returns_enriched_content() {
        let response = enrich(FakeProvider::default(), "generate_description").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let enriched: RecipeContent = serde_json::from_slice(&body).unwrap();
        assert_eq!(enriched.title, "Tomato Soup");
        assert!(enriched.description.is_some());
    }

    #[tokio::test]
    async fn test_unknown_enrichment_type() {
        let response = enrich(FakeProvider::default(), "translate").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unusable_reply_is_unprocessable() {
        let provider = FakeProvider::new().with_default_response("not json at all");
        let response = enrich(provider, "suggest_tags").await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_provider_failure_is_bad_gateway() {
        let response = enrich(FakeProvider::new(), "suggest_tags").await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
