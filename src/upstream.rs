// src/upstream.rs
//! Client for the hosted LLM messages API. Only the proxy uses it.

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use axum::body::Bytes;
use reqwest::Client;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    api_key: String,
    messages_url: String,
    api_version: String,
}

/// A successful upstream reply, kept as raw bytes so it can be relayed unchanged.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl UpstreamClient {
    pub fn new(config: &ProxyConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            messages_url: format!("{}/messages", config.upstream_base_url),
            api_version: config.anthropic_version.clone(),
        }
    }

    pub fn messages_url(&self) -> &str {
        &self.messages_url
    }

    /// Posts `body` as-is with the server-held credential attached.
    pub async fn forward(&self, body: &Value) -> Result<UpstreamReply, ProxyError> {
        let response = self
            .client
            .post(&self.messages_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await?;

        tracing::debug!("Upstream API response status {} ({} bytes)", status, body.len());

        if !status.is_success() {
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(UpstreamReply {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}
