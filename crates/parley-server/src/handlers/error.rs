//! Session error types

use thiserror::Error;

/// Errors that end a session
///
/// Domain errors never show up here: they are answered with a reply line and
/// the session carries on.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The connection was closed locally or by the server shutting down
    #[error("Connection closed")]
    ConnectionClosed,

    /// Reading from the socket failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Check if this is an ordinary hang-up rather than a fault
    pub fn is_disconnect(&self) -> bool {
        match self {
            Self::ConnectionClosed => true,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::UnexpectedEof
            ),
        }
    }
}

/// Session result type
pub type SessionResult<T> = Result<T, SessionError>;
