use chat_relay::{create_router, telemetry, upstream::UpstreamClient, AppState, ProxyConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    telemetry::init_logging(telemetry::proxy_default_filter())?;
    tracing::info!("chat_relay proxy starting up, version {}", env!("CARGO_PKG_VERSION"));

    let config = match ProxyConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };
    tracing::info!("Configuration: {:?}", config);

    let upstream = UpstreamClient::new(&config);
    tracing::info!("Forwarding /api/chat to {}", upstream.messages_url());

    let app = create_router(Arc::new(AppState { upstream }));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Proxy server listening on {}", listener.local_addr()?);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
