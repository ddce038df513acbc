//! Poll drafts built while the creator types the question and answers

use crate::text::{strip_line_terminator, truncate, MAX_OPTION_LEN, MAX_QUESTION_LEN};

/// Maximum number of answers in one poll
pub const MAX_POLL_OPTIONS: usize = 10;

/// Line that ends answer collection early (case-insensitive)
const DONE_SENTINEL: &str = "done";

/// Outcome of feeding one line to a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collect {
    /// Keep reading answers
    More,
    /// Collection is finished
    Done,
}

/// Question and answers gathered during the Collecting phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollDraft {
    question: String,
    answers: Vec<String>,
}

impl PollDraft {
    /// Start a draft from the raw question line
    pub fn new(question: &str) -> Self {
        Self {
            question: truncate(strip_line_terminator(question), MAX_QUESTION_LEN).to_string(),
            answers: Vec::with_capacity(MAX_POLL_OPTIONS),
        }
    }

    /// Feed one answer line
    ///
    /// The sentinel line is not recorded. Collection also finishes as soon as
    /// the tenth answer is recorded.
    pub fn accept(&mut self, line: &str) -> Collect {
        if self.is_full() {
            return Collect::Done;
        }

        let answer = strip_line_terminator(line);
        if answer.trim().eq_ignore_ascii_case(DONE_SENTINEL) {
            return Collect::Done;
        }

        self.answers
            .push(truncate(answer, MAX_OPTION_LEN).to_string());

        if self.is_full() {
            Collect::Done
        } else {
            Collect::More
        }
    }

    /// Check if no more answers can be added
    pub fn is_full(&self) -> bool {
        self.answers.len() >= MAX_POLL_OPTIONS
    }

    /// The question
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Answers recorded so far, in entry order
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub(crate) fn into_parts(self) -> (String, Vec<String>) {
        (self.question, self.answers)
    }
}
