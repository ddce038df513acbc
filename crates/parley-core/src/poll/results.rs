//! Poll results

use serde::Serialize;
use std::fmt;

/// One answer and its vote count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionTally {
    pub answer: String,
    pub votes: u64,
}

/// Final tally of a closed poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollResults {
    pub generation: u64,
    pub question: String,
    pub tallies: Vec<OptionTally>,
}

impl fmt::Display for PollResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "The results are in!\n{}", self.question)?;
        for tally in &self.tallies {
            write!(f, "\n{} - {} votes", tally.answer, tally.votes)?;
        }
        Ok(())
    }
}
