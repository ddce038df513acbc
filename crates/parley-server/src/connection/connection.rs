//! Individual client connection
//!
//! Owns the outbound queue of one socket and the token that marks it closed.

use crate::handlers::{SessionError, SessionResult};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Lines queued for one client before cross-session deliveries are dropped
pub const OUTBOUND_BUFFER: usize = 256;

/// How long the writer keeps flushing queued lines after the connection closes
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// A single client connection
pub struct Connection {
    /// Unique session ID
    session_id: String,

    /// Remote address, if the stream has one
    peer: Option<SocketAddr>,

    /// Channel feeding the writer task
    sender: mpsc::Sender<String>,

    /// Cancelled when the connection is closed or the server shuts down
    closed: CancellationToken,

    /// Connection creation time
    created_at: Instant,
}

impl Connection {
    /// Create a connection around an existing outbound channel
    pub fn new(
        session_id: String,
        peer: Option<SocketAddr>,
        sender: mpsc::Sender<String>,
        closed: CancellationToken,
    ) -> Arc<Self> {
        Arc::new(Self {
            session_id,
            peer,
            sender,
            closed,
            created_at: Instant::now(),
        })
    }

    /// Create a connection and spawn the writer task draining it into `writer`
    ///
    /// The connection closes when `shutdown` is cancelled.
    pub fn open<W>(
        session_id: String,
        peer: Option<SocketAddr>,
        writer: W,
        shutdown: &CancellationToken,
    ) -> (Arc<Self>, JoinHandle<()>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        let closed = shutdown.child_token();
        let connection = Self::new(session_id.clone(), peer, tx, closed.clone());

        let handle = tokio::spawn(write_loop(writer, rx, closed, session_id));

        (connection, handle)
    }

    /// Get the session ID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Get the remote address
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Queue a reply line for this client, waiting for room in the queue
    pub async fn send(&self, line: impl Into<String>) -> SessionResult<()> {
        if self.closed.is_cancelled() {
            return Err(SessionError::ConnectionClosed);
        }

        self.sender
            .send(line.into())
            .await
            .map_err(|_| SessionError::ConnectionClosed)
    }

    /// Queue a line from another session without waiting
    ///
    /// Returns `false` if the line was dropped because the queue is full or
    /// the connection is gone.
    pub fn deliver(&self, line: impl Into<String>) -> bool {
        if self.closed.is_cancelled() {
            return false;
        }

        match self.sender.try_send(line.into()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(session_id = %self.session_id, "Outbound queue full, line dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Close the connection; queued lines are still flushed
    pub fn close(&self) {
        self.closed.cancel();
    }

    /// Check if the connection has been closed
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled() || self.sender.is_closed()
    }

    /// Wait until the connection is closed
    pub async fn closed(&self) {
        self.closed.cancelled().await;
    }

    /// Get connection age
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("peer", &self.peer)
            .field("closed", &self.closed.is_cancelled())
            .finish()
    }
}

async fn write_line<W>(writer: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

async fn write_loop<W>(
    mut writer: W,
    mut rx: mpsc::Receiver<String>,
    closed: CancellationToken,
    session_id: String,
) where
    W: AsyncWrite + Unpin,
{
    loop {
        let line = tokio::select! {
            biased;
            line = rx.recv() => match line {
                Some(line) => line,
                None => break,
            },
            () = closed.cancelled() => break,
        };

        if let Err(e) = write_line(&mut writer, &line).await {
            tracing::debug!(session_id = %session_id, error = %e, "Write failed");
            closed.cancel();
            return;
        }
    }

    // Flush whatever was queued before the close, then hang up
    rx.close();
    let drain = async {
        while let Some(line) = rx.recv().await {
            if write_line(&mut writer, &line).await.is_err() {
                break;
            }
        }
        let _ = writer.shutdown().await;
    };
    if tokio::time::timeout(DRAIN_TIMEOUT, drain).await.is_err() {
        tracing::debug!(session_id = %session_id, "Gave up flushing closed connection");
    }

    closed.cancel();
}
