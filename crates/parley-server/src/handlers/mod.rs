//! Command handlers
//!
//! Handles parsed client commands for a session in the command loop.

mod error;
mod messaging;
mod poll;

pub use error::{SessionError, SessionResult};
pub use messaging::MessagingHandler;
pub use poll::PollHandler;

use crate::session::Session;
use parley_core::command::{HELP_TEXT, INVALID_COMMAND};
use parley_core::Command;
use tokio::io::AsyncRead;

/// What the command loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Close,
}

/// Dispatch parsed commands to the matching handler
pub struct MessageDispatcher;

impl MessageDispatcher {
    /// Handle one command line
    ///
    /// Domain failures are answered on the session's own connection; only
    /// connection faults come back as errors.
    pub async fn dispatch<R>(session: &mut Session<R>, command: Command<'_>) -> SessionResult<Flow>
    where
        R: AsyncRead + Unpin + Send,
    {
        tracing::trace!(
            slot = %session.slot(),
            name = %session.name(),
            command = command.verb(),
            "Received command"
        );

        match command {
            Command::List => MessagingHandler::list(session).await?,
            Command::Send { target, message } => {
                MessagingHandler::send(session, target, message).await?;
            }
            Command::Broadcast { message } => MessagingHandler::broadcast(session, message).await?,
            Command::Poll => PollHandler::create(session).await?,
            Command::Vote { choice } => PollHandler::vote(session, choice).await?,
            Command::Commands => session.reply(HELP_TEXT).await?,
            Command::Close => return Ok(Flow::Close),
            Command::Invalid => session.reply(INVALID_COMMAND).await?,
        }

        Ok(Flow::Continue)
    }
}
