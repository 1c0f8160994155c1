pub mod enrich;
pub mod enrichments;
pub mod suggestions;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/ai endpoints (mounted at /api/ai)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/enrichments", get(enrichments::list_enrichments))
        .route("/enrich", post(enrich::enrich_recipe))
        .route("/suggestions", post(suggestions::suggest_recipes))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        enrichments::list_enrichments,
        enrich::enrich_recipe,
        suggestions::suggest_recipes,
    ),
    components(schemas(
        potluck_core::enrichment::EnrichmentInfo,
        potluck_core::RecipeIdea,
        enrichments::EnrichmentsResponse,
        enrich::EnrichRequest,
        suggestions::SuggestionsRequest,
        suggestions::SuggestionsResponse,
    ))
)]
pub struct ApiDoc;
