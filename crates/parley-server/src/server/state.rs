//! Server state
//!
//! Shared state injected into every session, the poll watcher and the admin
//! router.

use crate::connection::Connection;
use crate::gate::ChatGate;
use parley_common::AppConfig;
use parley_core::{PollEngine, PollSnapshot, UserDirectory, DIRECTORY_CAPACITY};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The user directory as used by the server
pub type ChatDirectory = UserDirectory<Arc<Connection>>;

/// Server application state
///
/// Cheap to clone; every clone shares the same directory, poll and gate.
#[derive(Clone)]
pub struct ServerState {
    /// Slot table of connected clients
    directory: Arc<ChatDirectory>,
    /// The process-wide poll
    polls: Arc<PollEngine>,
    /// Start latch
    gate: ChatGate,
    /// Application configuration
    config: Arc<AppConfig>,
    /// Cancelled once the server is shutting down
    shutdown: CancellationToken,
}

/// Point-in-time counters for the admin surface
#[derive(Debug, Clone, Serialize)]
pub struct ServerStats {
    pub live_sessions: usize,
    pub active_users: usize,
    pub capacity: usize,
    pub chat_started: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub poll: PollSnapshot,
}

impl ServerState {
    /// Create state with a full-size directory
    pub fn new(config: AppConfig) -> Self {
        Self::with_capacity(config, DIRECTORY_CAPACITY)
    }

    /// Create state with a directory of the given size
    pub fn with_capacity(config: AppConfig, capacity: usize) -> Self {
        Self {
            directory: Arc::new(UserDirectory::with_capacity(capacity)),
            polls: PollEngine::new_shared(),
            gate: ChatGate::new(),
            config: Arc::new(config),
            shutdown: CancellationToken::new(),
        }
    }

    /// Get the user directory
    pub fn directory(&self) -> &Arc<ChatDirectory> {
        &self.directory
    }

    /// Get the poll engine
    pub fn polls(&self) -> &Arc<PollEngine> {
        &self.polls
    }

    /// Get the chat gate
    pub fn gate(&self) -> &ChatGate {
        &self.gate
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the shutdown token
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Begin shutting the server down
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            tracing::info!("Shutdown requested");
            self.shutdown.cancel();
        }
    }

    /// Collect the admin counters
    pub fn stats(&self) -> ServerStats {
        ServerStats {
            live_sessions: self.directory.live_count(),
            active_users: self.directory.active_count(),
            capacity: self.directory.capacity(),
            chat_started: self.gate.is_open(),
            chat_started_at: self.gate.opened_at(),
            poll: self.polls.snapshot(),
        }
    }
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("directory", &self.directory)
            .field("polls", &self.polls)
            .field("gate", &self.gate)
            .field("config", &"AppConfig")
            .finish()
    }
}
