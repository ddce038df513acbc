//! Client sessions
//!
//! One session per accepted connection: naming, waiting for the chat to
//! start, then the command loop until the client leaves.

mod serve;
mod session;

pub use serve::serve;
pub use session::{generate_id, Session, SessionPhase, COMMAND_PROMPT, NAME_PROMPT};
