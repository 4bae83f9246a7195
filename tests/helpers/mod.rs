#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use chat_relay::{create_router, upstream::UpstreamClient, AppState, ProxyConfig};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

pub const TEST_API_KEY: &str = "sk-test-key";

/// One request as the fake upstream saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub headers: HeaderMap,
    pub body: Value,
}

pub type Recorder = Arc<Mutex<Vec<Recorded>>>;

type Responder = Arc<dyn Fn(&Value) -> (StatusCode, String) + Send + Sync>;

#[derive(Clone)]
struct FakeUpstream {
    recorder: Recorder,
    respond: Responder,
}

async fn fake_messages(State(fake): State<FakeUpstream>, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let (status, reply) = (fake.respond)(&body);
    fake.recorder.lock().unwrap().push(Recorded { headers, body });
    (status, [("content-type", "application/json")], reply)
}

/// Serves `router` on an ephemeral local port.
pub async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Starts a fake messages API at `http://<addr>/v1/messages`.
pub async fn spawn_upstream<F>(respond: F) -> (SocketAddr, Recorder)
where
    F: Fn(&Value) -> (StatusCode, String) + Send + Sync + 'static,
{
    let recorder: Recorder = Arc::default();
    let fake = FakeUpstream {
        recorder: recorder.clone(),
        respond: Arc::new(respond),
    };
    let router = Router::new()
        .route("/v1/messages", post(fake_messages))
        .with_state(fake);
    (spawn(router).await, recorder)
}

/// An address nothing is listening on.
pub async fn dead_address() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn proxy_router(upstream: SocketAddr) -> Router {
    let base = format!("http://{}/v1", upstream);
    let config = ProxyConfig::from_lookup(|name| match name {
        "CLAUDE_API_KEY" => Some(TEST_API_KEY.to_string()),
        "UPSTREAM_BASE_URL" => Some(base.clone()),
        _ => None,
    })
    .unwrap();
    create_router(Arc::new(AppState {
        upstream: UpstreamClient::new(&config),
    }))
}
