//! # Card Server Library
//!
//! Shared types and the HTTP router for the card server.
//! This library is used by both the binary and integration tests.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use card_core::TemplateStore;

pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod routes;
pub mod validation;

pub use config::{ServerArgs, ServerConfig};
pub use error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Read-only template registry.
    pub store: Arc<TemplateStore>,
    /// Resolved server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Wrap a store and configuration for sharing across handlers.
    #[must_use]
    pub fn new(store: TemplateStore, config: ServerConfig) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
        }
    }
}

/// Build the application router: health checks and the card API.
///
/// Transport layers (CORS, request ids, tracing) and `/metrics` are added
/// by the binary.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoints (Kubernetes liveness and readiness)
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/health", get(health::readiness))
        .route("/api/templates", get(routes::list_templates))
        .route("/api/templates/{key}", get(routes::get_template))
        .route("/api/render", post(routes::render_json))
        .route("/api/render/html", post(routes::render_html))
        .route("/api/vcard", post(routes::export_vcard))
        .route("/api/share", post(routes::share_payload))
        .route_layer(middleware::from_fn(metrics::track_http))
        .layer(DefaultBodyLimit::max(validation::MAX_BODY_SIZE))
        .with_state(state)
}
