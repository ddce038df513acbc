//! Domain errors - error types for the domain layer
//!
//! Every variant is recoverable and scoped to the session that triggered it.
//! The `Display` text is the line sent back to that client.

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Capacity
    // =========================================================================
    #[error("Server is full, try again later.")]
    DirectoryFull,

    // =========================================================================
    // Messaging
    // =========================================================================
    #[error("Sorry, {0} is not a valid user.")]
    UserNotFound(String),

    #[error("You are not active.")]
    SenderInactive,

    // =========================================================================
    // Polls
    // =========================================================================
    #[error("Poll is currently active.")]
    PollAlreadyActive,

    #[error("No active polls.")]
    NoActivePoll,

    #[error("Invalid vote.")]
    InvalidVote,

    #[error("A poll needs at least one answer.")]
    EmptyPoll,

    #[error("This poll is no longer being collected.")]
    StalePoll,
}

impl DomainError {
    /// Get an error code string for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::DirectoryFull => "DIRECTORY_FULL",
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::SenderInactive => "SENDER_INACTIVE",
            Self::PollAlreadyActive => "POLL_ALREADY_ACTIVE",
            Self::NoActivePoll => "NO_ACTIVE_POLL",
            Self::InvalidVote => "INVALID_VOTE",
            Self::EmptyPoll => "EMPTY_POLL",
            Self::StalePoll => "STALE_POLL",
        }
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
