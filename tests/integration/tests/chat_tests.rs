//! Chat Integration Tests
//!
//! Each test starts its own server on a loopback port.
//!
//! Run with: cargo test -p integration-tests --test chat_tests

use integration_tests::{test_config, wait_until, TestServer};
use parley_core::command::INVALID_COMMAND;
use std::time::Duration;

// ============================================================================
// Naming
// ============================================================================

#[tokio::test]
async fn test_register_and_list() {
    let server = TestServer::start().await.expect("Failed to start server");

    let mut alice = server.join("alice").await.unwrap();
    let _bob = server.join("bob").await.unwrap();

    assert_eq!(alice.command("list").await.unwrap(), "alice bob");
}

#[tokio::test]
async fn test_long_name_is_truncated() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut client = server.connect().await.unwrap();

    client.line().await.unwrap();
    client.send(&"n".repeat(300)).await.unwrap();

    let welcome = client.line().await.unwrap();
    assert_eq!(welcome, format!("Welcome to the chat, {}!", "n".repeat(199)));
}

#[tokio::test]
async fn test_disconnect_before_naming_frees_slot() {
    let server = TestServer::start().await.expect("Failed to start server");
    let client = server.connect().await.unwrap();

    wait_until(Duration::from_secs(2), || server.state().directory().live_count() == 1)
        .await
        .unwrap();
    drop(client);

    wait_until(Duration::from_secs(2), || server.state().directory().live_count() == 0)
        .await
        .unwrap();
}

// ============================================================================
// Messaging
// ============================================================================

#[tokio::test]
async fn test_direct_message() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut alice = server.join("alice").await.unwrap();
    let mut bob = server.join("bob").await.unwrap();

    assert_eq!(alice.command("send bob see you at noon").await.unwrap(), "Message sent!");
    assert_eq!(bob.reply().await.unwrap(), "alice says: see you at noon");
}

#[tokio::test]
async fn test_direct_message_to_unknown_user() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut alice = server.join("alice").await.unwrap();

    assert_eq!(
        alice.command("send nobody hello").await.unwrap(),
        "Sorry, nobody is not a valid user."
    );
}

#[tokio::test]
async fn test_broadcast_reaches_everyone_else_once() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut alice = server.join("alice").await.unwrap();
    let mut bob = server.join("bob").await.unwrap();
    let mut carol = server.join("carol").await.unwrap();

    assert_eq!(alice.command("broadcast lunch?").await.unwrap(), "Broadcast sent!");
    assert_eq!(bob.reply().await.unwrap(), "alice says: lunch?");
    assert_eq!(carol.reply().await.unwrap(), "alice says: lunch?");

    // Next lines are the replies to list, not a second copy of the broadcast
    assert_eq!(alice.command("list").await.unwrap(), "alice bob carol");
    assert_eq!(bob.command("list").await.unwrap(), "alice bob carol");
}

#[tokio::test]
async fn test_duplicate_names_first_match_wins() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut first = server.join("sam").await.unwrap();
    let mut second = server.join("sam").await.unwrap();
    let mut bob = server.join("bob").await.unwrap();

    assert_eq!(bob.command("send sam hi").await.unwrap(), "Message sent!");
    assert_eq!(first.reply().await.unwrap(), "bob says: hi");
    assert_eq!(second.command("list").await.unwrap(), "sam sam bob");
}

#[tokio::test]
async fn test_invalid_commands() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut alice = server.join("alice").await.unwrap();

    for line in ["dance", "LIST", "send", "send bob", "broadcast", ""] {
        assert_eq!(alice.command(line).await.unwrap(), INVALID_COMMAND, "line {line:?}");
    }
}

#[tokio::test]
async fn test_commands_lists_help() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut alice = server.join("alice").await.unwrap();

    assert_eq!(alice.command("commands").await.unwrap(), "Available commands:");
    alice.expect_line("close - Quit the chat").await.unwrap();
}

#[tokio::test]
async fn test_close_releases_slot() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut alice = server.join("alice").await.unwrap();
    let mut bob = server.join("bob").await.unwrap();

    alice.send("close").await.unwrap();
    alice.expect_closed().await.unwrap();

    wait_until(Duration::from_secs(2), || server.state().directory().live_count() == 1)
        .await
        .unwrap();
    assert_eq!(bob.command("list").await.unwrap(), "bob");
    assert_eq!(
        bob.command("send alice still there?").await.unwrap(),
        "Sorry, alice is not a valid user."
    );
}

// ============================================================================
// Chat gate
// ============================================================================

#[tokio::test]
async fn test_sessions_wait_for_start() {
    let mut config = test_config();
    config.chat.auto_start = false;
    let server = TestServer::start_with_config(config)
        .await
        .expect("Failed to start server");

    let mut alice = server.join("alice").await.unwrap();
    let early = tokio::time::timeout(Duration::from_millis(200), alice.line()).await;
    assert!(early.is_err(), "no prompt before the chat starts");

    server.state().gate().open();
    assert_eq!(alice.command("list").await.unwrap(), "alice");
}

#[tokio::test]
async fn test_shutdown_closes_clients() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut alice = server.join("alice").await.unwrap();
    let state = server.state().clone();

    server.stop().await.unwrap();

    alice.expect_closed().await.unwrap();
    assert_eq!(state.directory().live_count(), 0);
}
