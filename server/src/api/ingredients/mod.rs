//! Stateless ingredient tools: parse free text and scale a list without
//! saving anything.

pub mod parse;
pub mod scale;

use crate::AppState;
use axum::routing::post;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/ingredients endpoints (mounted at /api/ingredients)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/parse", post(parse::parse_ingredients))
        .route("/scale", post(scale::scale_ingredients))
}

#[derive(OpenApi)]
#[openapi(
    paths(parse::parse_ingredients, scale::scale_ingredients),
    components(schemas(
        parse::ParseIngredientsRequest,
        scale::ScaleIngredientsRequest,
        scale::ScaleIngredientsResponse,
    ))
)]
pub struct ApiDoc;
