//! Admin Surface Integration Tests
//!
//! Run with: cargo test -p integration-tests --test admin_tests

use integration_tests::{assert_json, assert_status, test_config, wait_until, TestServer};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_stats_counts_sessions() {
    let server = TestServer::start().await.expect("Failed to start server");
    let _alice = server.join("alice").await.unwrap();
    let _pending = server.connect().await.unwrap();

    wait_until(Duration::from_secs(2), || server.state().directory().live_count() == 2)
        .await
        .unwrap();

    let response = server.get("/stats").await.unwrap();
    let stats: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(stats["live_sessions"], 2);
    assert_eq!(stats["active_users"], 1);
    assert_eq!(stats["capacity"], 1024);
    assert_eq!(stats["chat_started"], true);
    assert_eq!(stats["poll"]["state"], "idle");
}

#[tokio::test]
async fn test_start_endpoint_opens_gate() {
    let mut config = test_config();
    config.chat.auto_start = false;
    let server = TestServer::start_with_config(config)
        .await
        .expect("Failed to start server");
    let mut alice = server.join("alice").await.unwrap();

    let response = server.post("/admin/start").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["started"], true);

    assert_eq!(alice.command("list").await.unwrap(), "alice");

    // Starting twice is harmless
    let response = server.post("/admin/start").await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_shutdown_endpoint() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut alice = server.join("alice").await.unwrap();

    let response = server.post("/admin/shutdown").await.unwrap();
    assert_status(response, StatusCode::ACCEPTED).await.unwrap();

    alice.expect_closed().await.unwrap();
    assert!(server.state().shutdown_token().is_cancelled());
}
