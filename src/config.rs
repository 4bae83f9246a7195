// src/config.rs
//! Runtime configuration read from the process environment.
//!
//! Both binaries call `dotenvy::dotenv()` first, so a local `.env` file can
//! supply any of these variables during development.

use crate::error::ConfigError;
use std::fmt;

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

pub const DEFAULT_PROXY_URL: &str = "http://localhost:3000";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Settings for the proxy process. The API key only ever lives here.
#[derive(Clone)]
pub struct ProxyConfig {
    pub api_key: String,
    pub upstream_base_url: String,
    pub anthropic_version: String,
    pub bind_addr: String,
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = ["CLAUDE_API_KEY", "ANTHROPIC_API_KEY"]
            .iter()
            .filter_map(|name| lookup(*name))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let upstream_base_url = lookup("UPSTREAM_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_UPSTREAM_BASE_URL.to_string());

        let anthropic_version = lookup("ANTHROPIC_VERSION")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ANTHROPIC_VERSION.to_string());

        let bind_addr = lookup("BIND_ADDR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            api_key,
            upstream_base_url: upstream_base_url.trim_end_matches('/').to_string(),
            anthropic_version,
            bind_addr,
        })
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("api_key", &"<redacted>")
            .field("upstream_base_url", &self.upstream_base_url)
            .field("anthropic_version", &self.anthropic_version)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

/// Settings for the chat client. The client never sees a credential.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub proxy_url: String,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_tokens = match lookup("CHAT_MAX_TOKENS") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|_| ConfigError::Invalid {
                name: "CHAT_MAX_TOKENS".to_string(),
                value: raw.clone(),
            })?,
            None => defaults.max_tokens,
        };

        Ok(Self {
            proxy_url: lookup("CHAT_PROXY_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.proxy_url),
            model: lookup("CHAT_MODEL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.model),
            max_tokens,
        })
    }
}
