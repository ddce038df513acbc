//! Poll Integration Tests
//!
//! Polls are created with a short lifetime so expiry can be observed.
//!
//! Run with: cargo test -p integration-tests --test poll_tests

use integration_tests::{test_config_with_poll, wait_until, ChatClient, TestServer};
use parley_core::PollState;
use std::time::Duration;

const POLL_LIFETIME: Duration = Duration::from_secs(1);

async fn create_poll(client: &mut ChatClient, question: &str, answers: &[&str]) -> String {
    assert_eq!(
        client.command("poll").await.unwrap(),
        "What is the question you want to ask?"
    );
    client.send(question).await.unwrap();
    assert_eq!(
        client.reply().await.unwrap(),
        "Write up to 10 answers, one per line. Type 'DONE' when finished."
    );
    for answer in answers {
        client.send(answer).await.unwrap();
    }
    if answers.len() < 10 {
        client.send("DONE").await.unwrap();
    }
    client.reply().await.unwrap()
}

#[tokio::test]
async fn test_poll_lifecycle_and_tally() {
    let server = TestServer::start_with_config(test_config_with_poll(POLL_LIFETIME))
        .await
        .expect("Failed to start server");
    let mut alice = server.join("alice").await.unwrap();
    let mut bob = server.join("bob").await.unwrap();

    assert_eq!(
        create_poll(&mut alice, "Q", &["A", "B"]).await,
        "Poll created! It will close in 1 seconds."
    );

    for _ in 0..2 {
        assert_eq!(alice.command("vote 1").await.unwrap(), "Vote recorded.");
    }
    assert_eq!(bob.command("vote 1").await.unwrap(), "Vote recorded.");
    assert_eq!(bob.command("vote 2").await.unwrap(), "Vote recorded.");

    let expected = ["The results are in!", "Q", "A - 3 votes", "B - 1 votes"];
    assert_eq!(alice.replies(4).await.unwrap(), expected);
    assert_eq!(bob.replies(4).await.unwrap(), expected);

    wait_until(Duration::from_secs(2), || {
        server.state().polls().state() == PollState::Idle
    })
    .await
    .unwrap();

    assert_eq!(bob.command("vote 1").await.unwrap(), "No active polls.");
    assert_eq!(
        create_poll(&mut bob, "Again?", &["yes"]).await,
        "Poll created! It will close in 1 seconds."
    );
}

#[tokio::test]
async fn test_vote_prompt_shows_ballot() {
    let server = TestServer::start_with_config(test_config_with_poll(Duration::from_secs(30)))
        .await
        .expect("Failed to start server");
    let mut alice = server.join("alice").await.unwrap();
    let mut bob = server.join("bob").await.unwrap();

    create_poll(&mut alice, "Tea or coffee?", &["Tea", "Coffee"]).await;

    bob.send("vote").await.unwrap();
    assert_eq!(
        bob.replies(4).await.unwrap(),
        ["Tea or coffee?", "1. Tea", "2. Coffee", "Enter your vote (number):"]
    );
    bob.send("2").await.unwrap();
    assert_eq!(bob.reply().await.unwrap(), "Vote recorded.");

    let snapshot = server.state().polls().snapshot();
    assert_eq!(snapshot.options[0].votes, 0);
    assert_eq!(snapshot.options[1].votes, 1);
}

#[tokio::test]
async fn test_invalid_votes_leave_counts_unchanged() {
    let server = TestServer::start_with_config(test_config_with_poll(Duration::from_secs(30)))
        .await
        .expect("Failed to start server");
    let mut alice = server.join("alice").await.unwrap();

    create_poll(&mut alice, "Q", &["A", "B"]).await;

    for vote in ["vote 0", "vote 3", "vote -1", "vote two"] {
        assert_eq!(alice.command(vote).await.unwrap(), "Invalid vote.", "{vote}");
    }

    let snapshot = server.state().polls().snapshot();
    assert!(snapshot.options.iter().all(|option| option.votes == 0));
}

#[tokio::test]
async fn test_only_one_poll_at_a_time() {
    let server = TestServer::start_with_config(test_config_with_poll(Duration::from_secs(30)))
        .await
        .expect("Failed to start server");
    let mut alice = server.join("alice").await.unwrap();
    let mut bob = server.join("bob").await.unwrap();

    // While alice is still typing her answers
    alice.send("poll").await.unwrap();
    alice.reply().await.unwrap();
    wait_until(Duration::from_secs(2), || {
        server.state().polls().state() == PollState::Collecting
    })
    .await
    .unwrap();
    assert_eq!(bob.command("poll").await.unwrap(), "Poll is currently active.");
    assert_eq!(bob.command("vote 1").await.unwrap(), "No active polls.");

    alice.send("Q").await.unwrap();
    alice.reply().await.unwrap();
    alice.send("A").await.unwrap();
    alice.send("done").await.unwrap();
    assert_eq!(
        alice.reply().await.unwrap(),
        "Poll created! It will close in 30 seconds."
    );

    assert_eq!(bob.command("poll").await.unwrap(), "Poll is currently active.");
}

#[tokio::test]
async fn test_ten_answers_end_collection() {
    let server = TestServer::start_with_config(test_config_with_poll(Duration::from_secs(30)))
        .await
        .expect("Failed to start server");
    let mut alice = server.join("alice").await.unwrap();

    let answers: Vec<String> = (1..=10).map(|n| format!("option {n}")).collect();
    let answers: Vec<&str> = answers.iter().map(String::as_str).collect();

    assert_eq!(
        create_poll(&mut alice, "Pick", &answers).await,
        "Poll created! It will close in 30 seconds."
    );
    assert_eq!(server.state().polls().snapshot().options.len(), 10);
}

#[tokio::test]
async fn test_creator_disconnect_discards_poll() {
    let server = TestServer::start_with_config(test_config_with_poll(Duration::from_secs(30)))
        .await
        .expect("Failed to start server");
    let mut alice = server.join("alice").await.unwrap();
    let mut bob = server.join("bob").await.unwrap();

    alice.send("poll").await.unwrap();
    alice.reply().await.unwrap();
    alice.send("Q").await.unwrap();
    alice.reply().await.unwrap();
    drop(alice);

    wait_until(Duration::from_secs(2), || {
        server.state().polls().state() == PollState::Idle
    })
    .await
    .unwrap();

    assert_eq!(
        bob.command("poll").await.unwrap(),
        "What is the question you want to ask?"
    );
}
