//! HTTP gateway for Palaver.
//!
//! Serves the embedded chat dashboard, a health check, and the v1 session
//! API the dashboard talks to.
//!
//! Built on Axum for async HTTP.

pub mod api_v1;
pub mod frontend;

use axum::extract::DefaultBodyLimit;
use axum::{Router, http::HeaderValue, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use palaver_chat::{Orchestrator, SessionRegistry, SessionSettings};
use palaver_config::AppConfig;

pub use api_v1::{ApiV1State, SharedApiState};

/// Build the full router: health, v1 API, and the embedded frontend.
///
/// Layers applied:
/// - CORS limited to the configured origin
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(api_state: SharedApiState, allowed_origin: Option<HeaderValue>) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));
    if let Some(origin) = allowed_origin {
        cors = cors.allow_origin(origin);
    }

    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api_v1::v1_router(api_state))
        .merge(frontend::frontend_router())
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Build the shared API state from configuration.
///
/// Fails when the API token is missing, before anything is bound.
pub fn build_state(config: &AppConfig) -> Result<SharedApiState, Box<dyn std::error::Error>> {
    let provider = palaver_providers::build_from_config(config)?;
    let defaults = SessionSettings::from_config(config)?;

    Ok(Arc::new(ApiV1State {
        orchestrator: Orchestrator::from_config(provider, config),
        sessions: SessionRegistry::new(),
        defaults,
    }))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let host = config.gateway.host.clone();
    let port = config.gateway.port;
    let addr = format!("{host}:{port}");

    let api_state = build_state(&config)?;

    let origin = match format!("http://{addr}").parse::<HeaderValue>() {
        Ok(origin) => Some(origin),
        Err(e) => {
            warn!(addr = %addr, error = %e, "Could not build CORS origin; cross-origin requests disabled");
            None
        }
    };

    let app = build_router(api_state, origin);

    info!(
        addr = %addr,
        model = %config.default_model,
        persona = %config.default_persona,
        memory_turns = config.memory_turns,
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn config_with_token() -> AppConfig {
        AppConfig {
            api_key: Some("test-token".into()),
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn health_endpoint() {
        let state = build_state(&config_with_token()).unwrap();
        let app = build_router(state, None);

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn v1_routes_are_nested() {
        let state = build_state(&config_with_token()).unwrap();
        let app = build_router(state, HeaderValue::from_static("http://127.0.0.1:8501").into());

        let req = Request::builder()
            .uri("/v1/personas")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn missing_token_fails_before_serving() {
        let err = build_state(&AppConfig::default()).err().unwrap();
        assert!(err.to_string().contains("EURON_API_TOKEN"));
    }
}
