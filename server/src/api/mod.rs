pub mod ai;
pub mod blobs;
pub mod groups;
pub mod ingredients;
pub mod photos;
pub mod public;
pub mod recipes;
pub mod shares;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use potluck_core::llm::LlmError;
use serde::Serialize;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{OpenApi, ToSchema};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// JSON `{error}` body with the given status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Log a database failure and answer 500 without leaking details.
pub fn internal_error(context: &str, e: impl std::fmt::Display) -> Response {
    tracing::error!("{}: {}", context, e);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, context)
}

/// Map an upstream LLM failure onto a status code.
pub fn llm_error_response(e: &LlmError) -> Response {
    match e {
        LlmError::RateLimited { retry_after_secs } => {
            tracing::warn!(?retry_after_secs, "LLM provider rate limited");
            error_response(
                StatusCode::TOO_MANY_REQUESTS,
                "AI service is busy, try again shortly",
            )
        }
        LlmError::NotConfigured(reason) => {
            tracing::warn!("AI provider not configured: {}", reason);
            error_response(StatusCode::SERVICE_UNAVAILABLE, "AI service unavailable")
        }
        other => {
            tracing::error!("LLM call failed: {}", other);
            error_response(StatusCode::BAD_GATEWAY, "AI service error")
        }
    }
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Base spec with shared components and security
    #[derive(OpenApi)]
    #[openapi(
        info(title = "Potluck API", description = "Shared recipe box"),
        components(schemas(ErrorResponse))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        public::ApiDoc::openapi(),
        blobs::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
        photos::ApiDoc::openapi(),
        shares::ApiDoc::openapi(),
        groups::ApiDoc::openapi(),
        ai::ApiDoc::openapi(),
        ingredients::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_has_core_paths() {
        let spec = openapi();
        for path in [
            "/api/health",
            "/api/recipes",
            "/api/recipes/{id}",
            "/api/recipes/{id}/photos",
            "/api/recipes/{id}/shares",
            "/api/groups",
            "/api/ai/enrich",
            "/api/ingredients/parse",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_llm_error_statuses() {
        let rate_limited = LlmError::RateLimited {
            retry_after_secs: None,
        };
        assert_eq!(
            llm_error_response(&rate_limited).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            llm_error_response(&LlmError::NotConfigured("x".to_string())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            llm_error_response(&LlmError::RequestFailed("x".to_string())).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
