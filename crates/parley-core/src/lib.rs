//! # parley-core
//!
//! Domain layer for the chat service: the slot-based user directory, the poll
//! engine, command parsing, and the bounded-text rules shared by every session.
//! This crate has no dependency on the async runtime or the network.

pub mod command;
pub mod directory;
pub mod error;
pub mod poll;
pub mod text;

// Re-export commonly used types at crate root
pub use command::Command;
pub use directory::{SlotId, SlotLease, UserDirectory, DIRECTORY_CAPACITY};
pub use error::{DomainError, DomainResult};
pub use poll::{
    Ballot, Collect, OpenedPoll, OptionTally, PollDraft, PollEngine, PollResults, PollSnapshot,
    PollState, PollTicket, MAX_POLL_OPTIONS,
};
