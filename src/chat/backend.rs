// src/chat/backend.rs
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::models::chat::{ChatRequest, ChatResponse, Message};
use async_trait::async_trait;
use reqwest::Client;

/// Whatever turns a message history into the assistant's reply text.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, ClientError>;
}

/// Talks to the proxy over its JSON-body contract.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
    chat_url: String,
    model: String,
    max_tokens: u32,
}

impl ProxyClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: Client::new(),
            chat_url: format!("{}/api/chat", config.proxy_url),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl ChatBackend for ProxyClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, ClientError> {
        let request = ChatRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: messages.to_vec(),
        };

        let response = self.client.post(&self.chat_url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| ClientError::MalformedResponse(format!("{}: {}", e, text)))?;

        parsed
            .text()
            .map(str::to_owned)
            .ok_or_else(|| ClientError::MalformedResponse("no text content in response".to_string()))
    }
}
