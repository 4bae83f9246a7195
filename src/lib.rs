// lib.rs - proxy service and chat client library
pub mod app;
pub mod chat;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod telemetry;
pub mod upstream;

pub use app::{create_router, AppState};
pub use config::{ClientConfig, ProxyConfig};
pub use error::{ClientError, ConfigError, ProxyError};
