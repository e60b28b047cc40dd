//! Corner Store storefront library.
//!
//! This crate provides the storefront functionality as a library, allowing
//! it to be tested in-process and reused by `cs-cli`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod forms;
pub mod media;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn,
    routing::get,
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionStore;
use tracing::Span;

use crate::middleware::{
    RateLimiterLayer, create_session_layer, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Build the storefront router with every middleware except Sentry.
///
/// `session_store` is `PostgresStore` in production and
/// `tower_sessions::MemoryStore` in tests. Pass `None` for `auth_limiter`
/// where requests carry no client address.
pub fn app<S>(state: AppState, session_store: S, auth_limiter: Option<RateLimiterLayer>) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = create_session_layer(session_store, state.config());
    let static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes(auth_limiter))
        .nest_service("/static", ServeDir::new(static_dir))
        .nest_service("/media", ServeDir::new(state.media_dir()))
        .layer(from_fn(security_headers_middleware))
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies store connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use secrecy::SecretString;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{SentryConfig, StorefrontConfig};
    use crate::db::memory::MemoryStore;

    fn test_app() -> Router {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://127.0.0.1:3000".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            media_dir: PathBuf::from("media"),
            trust_proxy_headers: false,
            sentry: SentryConfig::default(),
        };
        let state = AppState::new(config, Arc::new(MemoryStore::new()));
        app(state, tower_sessions::MemoryStore::default(), None)
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        for uri in ["/health", "/health/ready"] {
            let resp = test_app()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_security_headers_and_request_id() {
        let resp = test_app()
            .oneshot(Request::get("/index/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key("x-request-id"));
        assert!(resp.headers().contains_key("content-security-policy"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let resp = test_app()
            .oneshot(Request::get("/wp-admin/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
