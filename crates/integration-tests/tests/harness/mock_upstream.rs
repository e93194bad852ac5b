//! Mock upstream provider for integration tests
//!
//! Serves a tiny store API with one route per upstream outcome the
//! classifier distinguishes.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Mock upstream that returns predictable responses
pub struct MockUpstream {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

#[derive(Default)]
struct MockState {
    request_count: AtomicU32,
    authorized_count: AtomicU32,
}

impl MockUpstream {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/v1/stores", routing::get(list_stores))
            .route("/v1/stores/{id}", routing::get(get_store))
            .route("/v1/users", routing::post(create_user))
            .route("/v1/maintenance", routing::get(maintenance))
            .route("/v1/accepted", routing::post(accepted))
            .route("/v1/teapot", routing::get(teapot))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL including the API version prefix
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Total requests received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    /// Requests that carried the configured API key
    pub fn authorized_count(&self) -> u32 {
        self.state.authorized_count.load(Ordering::Relaxed)
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn record(state: &MockState, headers: &HeaderMap) {
    state.request_count.fetch_add(1, Ordering::Relaxed);

    if headers.get("x-api-key").is_some_and(|v| v == "test-key") {
        state.authorized_count.fetch_add(1, Ordering::Relaxed);
    }
}

async fn list_stores(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Json<Value> {
    record(&state, &headers);
    Json(json!([{ "id": 1, "name": "Providencia" }, { "id": 2, "name": "Las Condes" }]))
}

async fn get_store(State(state): State<Arc<MockState>>, headers: HeaderMap, Path(id): Path<u32>) -> impl IntoResponse {
    record(&state, &headers);

    if id == 1 {
        (StatusCode::OK, Json(json!({ "id": 1, "name": "Providencia" })))
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "message": format!("store {id} not found") })))
    }
}

async fn create_user(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    record(&state, &headers);

    let name = body.get("name").cloned().unwrap_or(Value::Null);
    (StatusCode::CREATED, Json(json!({ "id": 3, "name": name })))
}

async fn maintenance(State(state): State<Arc<MockState>>, headers: HeaderMap) -> impl IntoResponse {
    record(&state, &headers);
    (StatusCode::SERVICE_UNAVAILABLE, "down for maintenance")
}

async fn accepted(State(state): State<Arc<MockState>>, headers: HeaderMap) -> impl IntoResponse {
    record(&state, &headers);
    (StatusCode::ACCEPTED, Json(json!({ "queued": true })))
}

async fn teapot(State(state): State<Arc<MockState>>, headers: HeaderMap) -> impl IntoResponse {
    record(&state, &headers);
    StatusCode::IM_A_TEAPOT
}
