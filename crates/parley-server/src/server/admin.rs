//! Admin HTTP surface
//!
//! Health, counters, and the operator's start and shutdown triggers.

use super::{ServerState, ServerStats};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

/// Create the admin router
pub fn create_router() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(stats))
        .route("/admin/start", post(start_chat))
        .route("/admin/shutdown", post(shutdown))
}

/// Build the complete admin application
pub fn create_app(state: ServerState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn stats(State(state): State<ServerState>) -> Json<ServerStats> {
    Json(state.stats())
}

/// Open the chat gate (idempotent)
async fn start_chat(State(state): State<ServerState>) -> Json<Value> {
    if !state.gate().open() {
        tracing::debug!("Chat already started");
    }
    Json(json!({ "started": true }))
}

async fn shutdown(State(state): State<ServerState>) -> StatusCode {
    state.shutdown();
    StatusCode::ACCEPTED
}
