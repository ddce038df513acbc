//! Chat gate
//!
//! A write-once latch: sessions that finished naming wait here until the
//! operator starts the chat.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

/// Process-wide start latch shared by every session
#[derive(Clone)]
pub struct ChatGate {
    tx: Arc<watch::Sender<bool>>,
    opened_at: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl ChatGate {
    /// Create a closed gate
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            opened_at: Arc::new(Mutex::new(None)),
        }
    }

    /// Open the gate, releasing every waiting session
    ///
    /// Returns `false` if it was already open.
    pub fn open(&self) -> bool {
        let opened = self.tx.send_if_modified(|open| {
            if *open {
                false
            } else {
                *open = true;
                true
            }
        });

        if opened {
            *self.opened_at.lock() = Some(Utc::now());
            tracing::info!("Chat started");
        }

        opened
    }

    /// Check if the gate is open
    pub fn is_open(&self) -> bool {
        *self.tx.borrow()
    }

    /// When the gate was opened
    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        *self.opened_at.lock()
    }

    /// Wait until the gate is open
    pub async fn wait_open(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns once open
        let _ = rx.wait_for(|open| *open).await;
    }
}

impl Default for ChatGate {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChatGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatGate")
            .field("open", &self.is_open())
            .finish()
    }
}
