//! Session state machine

use crate::connection::{Connection, LineReader};
use crate::handlers::{Flow, MessageDispatcher, SessionResult};
use crate::server::ServerState;
use parley_core::text::{normalize_name, MAX_LINE_LEN};
use parley_core::{Command, DomainError, SlotId, SlotLease};
use std::sync::Arc;
use tokio::io::AsyncRead;

/// Sent once, right after the connection is accepted
pub const NAME_PROMPT: &str = "Enter your name: ";

/// Sent before every command read
pub const COMMAND_PROMPT: &str = ">";

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Naming,
    WaitingForStart,
    CommandLoop,
    Closed,
}

/// Generate a new session ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A client session
///
/// Owns the slot lease, so the slot is released on every exit path, including
/// a panic in a handler.
pub struct Session<R> {
    state: ServerState,
    connection: Arc<Connection>,
    lease: SlotLease<Arc<Connection>>,
    reader: LineReader<R>,
    name: String,
    phase: SessionPhase,
}

impl<R> Session<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(
        state: ServerState,
        connection: Arc<Connection>,
        lease: SlotLease<Arc<Connection>>,
        reader: LineReader<R>,
    ) -> Self {
        Self {
            state,
            connection,
            lease,
            reader,
            name: String::new(),
            phase: SessionPhase::Naming,
        }
    }

    /// Get the shared server state
    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Get the connection
    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    /// Get the directory slot this session owns
    pub fn slot(&self) -> SlotId {
        self.lease.slot()
    }

    /// Display name (empty until naming completes)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the slot is still marked active
    pub fn is_active(&self) -> bool {
        self.lease.is_active()
    }

    /// Send a reply line to this client
    pub async fn reply(&self, line: impl Into<String>) -> SessionResult<()> {
        self.connection.send(line).await
    }

    /// Reply with a domain error's text
    pub async fn reject(&self, err: DomainError) -> SessionResult<()> {
        tracing::debug!(slot = %self.slot(), code = err.code(), "Request refused");
        self.reply(err.to_string()).await
    }

    /// Read the next line from this client
    ///
    /// Returns `None` when the client hung up or the connection was closed.
    pub async fn read_line(&mut self) -> SessionResult<Option<String>> {
        tokio::select! {
            biased;
            () = self.connection.closed() => Ok(None),
            line = self.reader.next_line(MAX_LINE_LEN) => Ok(line?),
        }
    }

    /// Send `prompt`, then read the answer
    pub async fn prompt(&mut self, prompt: &str) -> SessionResult<Option<String>> {
        self.reply(prompt).await?;
        self.read_line().await
    }

    /// Drive the session from naming to the end of the command loop
    pub async fn run(&mut self) -> SessionResult<()> {
        let Some(raw) = self.prompt(NAME_PROMPT).await? else {
            tracing::debug!(slot = %self.slot(), "Client left before naming");
            return Ok(());
        };

        self.name = normalize_name(&raw);
        if !self.lease.activate(&self.name) {
            tracing::warn!(slot = %self.slot(), "Slot no longer leased, name not stored");
        }
        tracing::info!(slot = %self.slot(), name = %self.name, "User joined");
        self.reply(format!("Welcome to the chat, {}!", self.name))
            .await?;

        self.phase = SessionPhase::WaitingForStart;
        if !self.wait_for_start().await {
            return Ok(());
        }

        self.phase = SessionPhase::CommandLoop;
        while let Some(line) = self.prompt(COMMAND_PROMPT).await? {
            let command = Command::parse(&line);
            if MessageDispatcher::dispatch(self, command).await? == Flow::Close {
                tracing::debug!(slot = %self.slot(), name = %self.name, "Client closed session");
                break;
            }
        }

        Ok(())
    }

    async fn wait_for_start(&self) -> bool {
        if self.state.gate().is_open() {
            return true;
        }

        tracing::debug!(slot = %self.slot(), "Waiting for chat to start");
        tokio::select! {
            biased;
            () = self.connection.closed() => false,
            () = self.state.gate().wait_open() => true,
        }
    }

    /// Release the slot and close the connection
    pub fn close(&mut self) {
        if self.phase != SessionPhase::Closed {
            self.phase = SessionPhase::Closed;
            self.lease.release();
            self.connection.close();
        }
    }
}

impl<R> std::fmt::Debug for Session<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("session_id", &self.connection.session_id())
            .field("slot", &self.lease.slot())
            .field("name", &self.name)
            .field("phase", &self.phase)
            .finish()
    }
}
