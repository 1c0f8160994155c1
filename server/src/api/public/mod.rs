pub mod health;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for public endpoints (no auth required)
pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health::health))
}

#[derive(OpenApi)]
#[openapi(paths(health::health), components(schemas(health::HealthResponse)))]
pub struct ApiDoc;
