//! Poll expiry watcher
//!
//! One task per opened poll. It sleeps until the deadline, closes the poll if
//! that generation is still Active, announces the tally to every active
//! session and then returns the engine to Idle.

use super::fan_out;
use crate::server::ServerState;
use parley_core::OpenedPoll;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Spawn the watcher for a freshly opened poll
pub fn spawn_expiry_watcher(state: ServerState, poll: OpenedPoll) -> JoinHandle<()> {
    tokio::spawn(async move {
        let generation = poll.generation;
        let deadline = Instant::from_std(poll.deadline);

        tokio::select! {
            () = tokio::time::sleep_until(deadline) => {}
            () = state.shutdown_token().cancelled() => {
                tracing::debug!(generation, "Poll watcher stopped by shutdown");
                return;
            }
        }

        // Poll lock is released before the directory is touched
        let Some(results) = state.polls().expire(generation) else {
            tracing::debug!(generation, "Poll already gone when its deadline passed");
            return;
        };

        let delivered = fan_out(state.directory(), None, &results.to_string());
        tracing::info!(generation, delivered, "Poll results announced");

        state.polls().finish(generation);
    })
}
