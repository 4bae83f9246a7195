// src/handlers/status.rs
use crate::app::AppState;
use axum::{extract::Extension, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn status_routes() -> Router {
    Router::new().route("/api/status", get(api_status))
}

async fn api_status(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "upstream": state.upstream.messages_url(),
        "endpoints": {
            "chat": "/api/chat",
            "status": "/api/status"
        }
    }))
}
