//! Poll engine
//!
//! A single process-wide timed poll: `Idle -> Collecting -> Active -> Closed -> Idle`.
//! Every transition and every vote is serialized through one lock that is
//! independent of the user directory lock.

mod draft;
mod engine;
mod results;

pub use draft::{Collect, PollDraft, MAX_POLL_OPTIONS};
pub use engine::{Ballot, OpenedPoll, PollEngine, PollSnapshot, PollState, PollTicket};
pub use results::{OptionTally, PollResults};
