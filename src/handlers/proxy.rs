// src/handlers/proxy.rs
//! `POST /api/chat`: relay a messages request to the upstream API.

use crate::app::AppState;
use crate::error::ProxyError;
use axum::{
    body::Bytes,
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::Value;
use std::sync::Arc;

pub fn proxy_routes() -> Router {
    Router::new().route("/api/chat", post(relay_chat))
}

async fn relay_chat(
    Extension(state): Extension<Arc<AppState>>,
    raw: Bytes,
) -> Result<Response, ProxyError> {
    // the content-type header is not checked; only the bytes matter
    let body: Value = serde_json::from_slice(&raw).map_err(|e| {
        tracing::warn!("Request body is not JSON: {}", e);
        ProxyError::from(e)
    })?;

    // message content is never logged
    let model = body.get("model").and_then(Value::as_str).unwrap_or("unspecified");
    let message_count = body
        .get("messages")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    tracing::info!(model = %model, messages = message_count, "relaying chat request");

    let reply = state.upstream.forward(&body).await.map_err(|e| {
        tracing::error!("Upstream call failed: {}", e);
        e
    })?;

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::OK);
    let content_type = reply
        .content_type
        .unwrap_or_else(|| "application/json".to_string());

    Ok((status, [(header::CONTENT_TYPE, content_type)], reply.body).into_response())
}
