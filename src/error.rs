// src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("CLAUDE_API_KEY (or ANTHROPIC_API_KEY) must be set")]
    MissingApiKey,
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: String, value: String },
}

/// Failures on the proxy side. Every variant collapses to a generic 500.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),
    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Upstream API error ({status}): {body}")]
    Upstream { status: u16, body: String },
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// Failures seen by the chat client when talking to the proxy.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request to proxy failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP error! status: {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Unexpected response shape: {0}")]
    MalformedResponse(String),
}
