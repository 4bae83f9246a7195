// src/app.rs
use crate::handlers;
use crate::middleware;
use crate::upstream::UpstreamClient;
use axum::{Extension, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared proxy state. Requests are handled independently; nothing here is mutated.
pub struct AppState {
    pub upstream: UpstreamClient,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(handlers::proxy::proxy_routes())
        .merge(handlers::status::status_routes())
        .layer(axum::middleware::from_fn(middleware::logging::request_logging_middleware))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}
