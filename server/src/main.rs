mod access;
mod api;
mod auth;
mod changes;
mod config;
mod db;
mod models;
mod photos;
mod raw_sql;
mod schema;
mod storage;

use axum::extract::{FromRef, MatchedPath};
use axum::http::Request;
use axum::Router;
use config::{BlobBackend, ServerConfig};
use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use potluck_core::llm::{create_provider_from_env, LlmProvider};
use std::env;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;
use storage::{BlobStore, FsBlobStore, MemoryBlobStore, UrlSigner};
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use utoipa_swagger_ui::SwaggerUi;

const SERVICE_NAME: &str = "potluck-server";

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<db::DbPool>,
    pub blobs: Arc<dyn BlobStore>,
    pub signer: Arc<UrlSigner>,
    pub llm: Arc<dyn LlmProvider>,
}

impl FromRef<AppState> for Arc<db::DbPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<dyn BlobStore> {
    fn from_ref(state: &AppState) -> Self {
        state.blobs.clone()
    }
}

impl FromRef<AppState> for Arc<UrlSigner> {
    fn from_ref(state: &AppState) -> Self {
        state.signer.clone()
    }
}

impl FromRef<AppState> for Arc<dyn LlmProvider> {
    fn from_ref(state: &AppState) -> Self {
        state.llm.clone()
    }
}

fn build_otel_providers(
    endpoint: &str,
    service_name: &str,
) -> Result<(SdkTracerProvider, SdkLoggerProvider), opentelemetry_otlp::ExporterBuildError> {
    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    let trace_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let trace_provider = SdkTracerProvider::builder()
        .with_batch_exporter(trace_exporter)
        .with_resource(resource.clone())
        .build();

    let log_exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let log_provider = SdkLoggerProvider::builder()
        .with_batch_exporter(log_exporter)
        .with_resource(resource)
        .build();

    Ok((trace_provider, log_provider))
}

/// Initialize telemetry with optional OpenTelemetry export.
/// If OTEL_EXPORTER_OTLP_ENDPOINT is set and reachable, traces and logs are
/// sent to the collector. Otherwise, only console logging is used.
fn init_telemetry() {
    let fmt_layer = tracing_subscriber::fmt::layer();
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();

    let Some(endpoint) = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok() else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
        tracing::debug!("OTEL_EXPORTER_OTLP_ENDPOINT not set, using console logging only");
        return;
    };

    let host_port = endpoint
        .trim_start_matches("http://")
        .trim_start_matches("https://");

    // Quick TCP check to see if the collector is up (resolve hostname first)
    let is_reachable = host_port
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| TcpStream::connect_timeout(&addr, Duration::from_millis(100)).is_ok())
        .unwrap_or(false);

    if !is_reachable {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
        tracing::info!(
            "OpenTelemetry endpoint {} not reachable, using console logging only",
            endpoint
        );
        return;
    }

    let service_name = env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| SERVICE_NAME.to_string());

    match build_otel_providers(&endpoint, &service_name) {
        Ok((trace_provider, log_provider)) => {
            let tracer = trace_provider.tracer(SERVICE_NAME);
            opentelemetry::global::set_tracer_provider(trace_provider);

            let otel_trace_layer = tracing_opentelemetry::layer().with_tracer(tracer);
            let otel_log_layer = OpenTelemetryTracingBridge::new(&log_provider);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .with(otel_trace_layer)
                .with(otel_log_layer)
                .init();

            tracing::info!(
                "OpenTelemetry enabled, exporting traces and logs to {} as {}",
                endpoint,
                service_name
            );
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .init();
            tracing::warn!("Failed to create OTLP exporters, using console logging only: {}", e);
        }
    }
}

/// The full HTTP surface, minus the listener.
fn app(state: AppState) -> Router {
    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    Router::new()
        .merge(api::public::router())
        .nest("/api/blobs", api::blobs::router())
        .nest(
            "/api/recipes",
            api::recipes::router()
                .merge(api::photos::router())
                .merge(api::shares::router()),
        )
        .nest("/api/groups", api::groups::router())
        .nest("/api/ai", api::ai::router())
        .nest("/api/ingredients", api::ingredients::router())
        .with_state(state)
        .merge(swagger_ui)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());

                    // Health checks poll constantly
                    if matched_path == "/api/health" {
                        tracing::trace_span!("http_request")
                    } else {
                        tracing::info_span!(
                            "http_request",
                            method = %request.method(),
                            path = %matched_path,
                        )
                    }
                })
                .on_request(|_request: &Request<_>, _span: &Span| {})
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        if span.metadata().map(|m| m.level()) == Some(&tracing::Level::TRACE) {
                            return;
                        }
                        let status = response.status().as_u16();
                        if status >= 500 {
                            tracing::error!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request failed with server error"
                            );
                        } else {
                            tracing::info!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request completed"
                            );
                        }
                    },
                )
                .on_failure(
                    |error: tower_http::classify::ServerErrorsFailureClass,
                     latency: Duration,
                     _span: &Span| {
                        tracing::error!(
                            error = %error,
                            latency_ms = %latency.as_millis(),
                            "request failed"
                        );
                    },
                ),
        )
}

fn blob_store(backend: &BlobBackend) -> Arc<dyn BlobStore> {
    match backend {
        BlobBackend::Fs(root) => Arc::new(FsBlobStore::new(root.clone())),
        BlobBackend::Memory => {
            tracing::warn!("Using in-memory blob store; photos are lost on restart");
            Arc::new(MemoryBlobStore::new())
        }
    }
}

#[tokio::main]
async fn main() {
    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        match api::openapi().to_pretty_json() {
            Ok(spec) => println!("{}", spec),
            Err(e) => {
                eprintln!("Failed to render OpenAPI spec: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    init_telemetry();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match db::create_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let signer = match UrlSigner::new(
        config.url_signing_secret.as_bytes(),
        &config.public_base_url,
        config.signed_url_ttl_secs,
    ) {
        Ok(signer) => signer,
        Err(e) => {
            tracing::error!("Invalid URL_SIGNING_SECRET: {}", e);
            std::process::exit(1);
        }
    };

    let llm: Arc<dyn LlmProvider> = match create_provider_from_env() {
        Ok(provider) => Arc::from(provider),
        Err(e) => {
            tracing::error!("Failed to configure AI provider: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        provider = llm.provider_name(),
        model = llm.model_name(),
        "AI provider ready"
    );

    let state = AppState {
        pool: Arc::new(pool),
        blobs: blob_store(&config.blob_backend),
        signer: Arc::new(signer),
        llm,
    };

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.bind_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", config.bind_addr);
    tracing::info!(
        "Swagger UI available at {}/swagger-ui/",
        config.public_base_url
    );

    if let Err(e) = axum::serve(listener, app(state)).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::StatusCode;
    use diesel::r2d2::{ConnectionManager, Pool};
    use potluck_core::llm::FakeProvider;
    use tower::ServiceExt;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn test_state() -> AppState {
        // Never connected to; the routes exercised here fail before needing it
        let pool = Pool::builder().build_unchecked(ConnectionManager::new("postgres://invalid"));
        AppState {
            pool: Arc::new(pool),
            blobs: Arc::new(MemoryBlobStore::new()),
            signer: Arc::new(UrlSigner::new(SECRET, "http://localhost:3000", 3600).unwrap()),
            llm: Arc::new(FakeProvider::default()),
        }
    }

    async fn send(state: AppState, request: Request<Body>) -> axum::response::Response {
        app(state).oneshot(request).await.unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = send(test_state(), get("/api/health")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        for uri in [
            "/api/recipes",
            "/api/recipes/tags",
            "/api/groups",
            "/api/ai/enrichments",
        ] {
            let response = send(test_state(), get(uri)).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_malformed_authorization_header() {
        let request = Request::builder()
            .uri("/api/groups")
            .header("Authorization", "Token abc")
            .body(Body::empty())
            .unwrap();
        let response = send(test_state(), request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_signed_blob_round_trip() {
        let state = test_state();
        state
            .blobs
            .put("recipes/r1/p1.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();

        let url = state.signer.signed_url("recipes/r1/p1.jpg");
        let path = url.trim_start_matches("http://localhost:3000");
        let response = send(state, get(path)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "image/jpeg"
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.as_ref(), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn test_blob_with_bad_signature_is_forbidden() {
        let state = test_state();
        state
            .blobs
            .put("recipes/r1/p1.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();

        let expires = chrono::Utc::now().timestamp() + 60;
        let uri = format!(
            "/api/blobs/recipes/r1/p1.jpg?expires={}&signature=deadbeef",
            expires
        );
        let response = send(state, get(&uri)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_blob_without_link_params_is_bad_request() {
        for uri in [
            "/api/blobs/recipes/r1/p1.jpg",
            "/api/blobs/recipes/r1/p1.jpg?signature=deadbeef",
            "/api/blobs/recipes/r1/p1.jpg?expires=soon&signature=deadbeef",
        ] {
            let response = send(test_state(), get(uri)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["error"], "Link needs numeric expires and a signature");
        }
    }

    #[tokio::test]
    async fn test_openapi_json_served() {
        let response = send(test_state(), get("/api-docs/openapi.json")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
