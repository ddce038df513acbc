//! list / send / broadcast

use super::SessionResult;
use crate::broadcast::fan_out;
use crate::session::Session;
use parley_core::DomainError;
use tokio::io::AsyncRead;

/// Reply after a direct message was queued
pub const MESSAGE_SENT: &str = "Message sent!";

/// Reply after a broadcast was queued
pub const BROADCAST_SENT: &str = "Broadcast sent!";

/// Handles the messaging commands
pub struct MessagingHandler;

impl MessagingHandler {
    /// Reply with the active names, in slot order, separated by spaces
    pub async fn list<R>(session: &Session<R>) -> SessionResult<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        let names = session.state().directory().snapshot_active_names();
        session.reply(names.join(" ")).await
    }

    /// Deliver a private message to the first active user named `target`
    pub async fn send<R>(session: &Session<R>, target: &str, message: &str) -> SessionResult<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        let Some((slot, recipient)) = session.state().directory().find_connection(target) else {
            return session
                .reject(DomainError::UserNotFound(target.to_string()))
                .await;
        };

        let delivered = recipient.deliver(format!("{} says: {}", session.name(), message));

        tracing::debug!(
            from = %session.slot(),
            to = %slot,
            delivered,
            "Direct message"
        );

        session.reply(MESSAGE_SENT).await
    }

    /// Deliver a message to every other active user
    pub async fn broadcast<R>(session: &Session<R>, message: &str) -> SessionResult<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        if !session.is_active() {
            return session.reject(DomainError::SenderInactive).await;
        }

        let line = format!("{} says: {}", session.name(), message);
        let delivered = fan_out(session.state().directory(), Some(session.slot()), &line);

        tracing::debug!(from = %session.slot(), delivered, "Broadcast");

        session.reply(BROADCAST_SENT).await
    }
}
