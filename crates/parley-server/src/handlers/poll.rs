//! poll / vote

use super::SessionResult;
use crate::broadcast::spawn_expiry_watcher;
use crate::session::Session;
use parley_core::{Collect, PollDraft, PollEngine, PollTicket, MAX_POLL_OPTIONS};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;

/// Asks the poll creator for the question
pub const QUESTION_PROMPT: &str = "What is the question you want to ask?";

/// Asks the voter for an answer number
pub const VOTE_PROMPT: &str = "Enter your vote (number):";

/// Reply after a vote was counted
pub const VOTE_RECORDED: &str = "Vote recorded.";

fn answers_prompt() -> String {
    format!("Write up to {MAX_POLL_OPTIONS} answers, one per line. Type 'DONE' when finished.")
}

/// Seconds announced to the creator, rounded up
fn whole_seconds(duration: Duration) -> u128 {
    duration.as_millis().div_ceil(1000)
}

/// Returns the poll to Idle if collection does not reach `open`
struct CollectionGuard {
    engine: Arc<PollEngine>,
    ticket: PollTicket,
}

impl Drop for CollectionGuard {
    fn drop(&mut self) {
        // No-op once the poll has been opened or reset
        if self.engine.abandon(self.ticket) {
            tracing::info!(generation = self.ticket.generation(), "Poll creator left, poll discarded");
        }
    }
}

/// Handles the poll commands
pub struct PollHandler;

impl PollHandler {
    /// Collect a question and answers from this client, then open the poll
    pub async fn create<R>(session: &mut Session<R>) -> SessionResult<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        let engine = Arc::clone(session.state().polls());

        let ticket = match engine.begin() {
            Ok(ticket) => ticket,
            Err(e) => return session.reject(e).await,
        };
        let _guard = CollectionGuard {
            engine: Arc::clone(&engine),
            ticket,
        };

        let Some(question) = session.prompt(QUESTION_PROMPT).await? else {
            return Ok(());
        };
        let mut draft = PollDraft::new(&question);

        session.reply(answers_prompt()).await?;
        loop {
            let Some(line) = session.read_line().await? else {
                return Ok(());
            };
            if draft.accept(&line) == Collect::Done {
                break;
            }
        }

        let duration = session.state().config().poll.duration();
        match engine.open(ticket, draft, duration) {
            Ok(opened) => {
                spawn_expiry_watcher(session.state().clone(), opened);
                tracing::info!(
                    slot = %session.slot(),
                    name = %session.name(),
                    generation = opened.generation,
                    "Poll created"
                );
                session
                    .reply(format!(
                        "Poll created! It will close in {} seconds.",
                        whole_seconds(duration)
                    ))
                    .await
            }
            Err(e) => session.reject(e).await,
        }
    }

    /// Record a vote on the active poll
    ///
    /// Without an inline choice the ballot is shown and the choice read from
    /// the next line.
    pub async fn vote<R>(session: &mut Session<R>, choice: Option<&str>) -> SessionResult<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        let engine = Arc::clone(session.state().polls());

        let ballot = match engine.ballot() {
            Ok(ballot) => ballot,
            Err(e) => return session.reject(e).await,
        };

        let choice = match choice {
            Some(choice) => choice.to_string(),
            None => {
                session.reply(ballot.to_string()).await?;
                match session.prompt(VOTE_PROMPT).await? {
                    Some(line) => line,
                    None => return Ok(()),
                }
            }
        };

        match engine.vote(ballot.generation, &choice) {
            Ok(votes) => {
                tracing::debug!(slot = %session.slot(), generation = ballot.generation, votes, "Vote counted");
                session.reply(VOTE_RECORDED).await
            }
            Err(e) => session.reject(e).await,
        }
    }
}
