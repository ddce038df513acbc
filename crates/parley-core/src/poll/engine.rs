//! Poll state machine

use super::{OptionTally, PollDraft, PollResults};
use crate::error::{DomainError, DomainResult};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Poll lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollState {
    /// No poll exists
    Idle,
    /// The creator is typing the question and answers
    Collecting,
    /// Accepting votes until the deadline
    Active,
    /// Deadline reached, results being announced
    Closed,
}

impl PollState {
    /// Whether a new poll may not be started in this state
    pub fn blocks_new_poll(self) -> bool {
        matches!(self, Self::Collecting | Self::Active)
    }
}

/// Proof that the holder started the current collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTicket {
    generation: u64,
}

impl PollTicket {
    /// Generation of the poll being collected
    pub fn generation(self) -> u64 {
        self.generation
    }
}

/// A poll that just became Active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenedPoll {
    pub generation: u64,
    pub deadline: Instant,
    pub duration: Duration,
}

/// What a voter sees before choosing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    pub generation: u64,
    pub question: String,
    pub answers: Vec<String>,
}

impl fmt::Display for Ballot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.question)?;
        for (index, answer) in self.answers.iter().enumerate() {
            write!(f, "\n{}. {}", index + 1, answer)?;
        }
        Ok(())
    }
}

/// Read-only view of the poll for the admin surface
#[derive(Debug, Clone, Serialize)]
pub struct PollSnapshot {
    pub state: PollState,
    pub generation: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    pub options: Vec<OptionTally>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_secs: Option<u64>,
}

#[derive(Debug)]
struct PollInner {
    state: PollState,
    generation: u64,
    question: String,
    options: Vec<OptionTally>,
    deadline: Option<Instant>,
}

impl PollInner {
    fn reset(&mut self) {
        self.state = PollState::Idle;
        self.question.clear();
        self.options.clear();
        self.deadline = None;
    }

    fn is_live(&self, generation: u64, state: PollState) -> bool {
        self.state == state && self.generation == generation
    }
}

/// The single process-wide poll
pub struct PollEngine {
    inner: Mutex<PollInner>,
}

impl PollEngine {
    /// Create an idle poll engine
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(PollInner {
                state: PollState::Idle,
                generation: 0,
                question: String::new(),
                options: Vec::new(),
                deadline: None,
            }),
        }
    }

    /// Create a new poll engine wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Idle (or Closed) -> Collecting
    ///
    /// Rejected while another poll is being collected or is accepting votes.
    pub fn begin(&self) -> DomainResult<PollTicket> {
        let mut inner = self.inner.lock();

        if inner.state.blocks_new_poll() {
            return Err(DomainError::PollAlreadyActive);
        }

        inner.reset();
        inner.generation += 1;
        inner.state = PollState::Collecting;

        tracing::debug!(generation = inner.generation, "Poll collection started");

        Ok(PollTicket {
            generation: inner.generation,
        })
    }

    /// Collecting -> Active
    ///
    /// A draft without answers abandons the poll instead.
    pub fn open(
        &self,
        ticket: PollTicket,
        draft: PollDraft,
        duration: Duration,
    ) -> DomainResult<OpenedPoll> {
        let mut inner = self.inner.lock();

        if !inner.is_live(ticket.generation, PollState::Collecting) {
            return Err(DomainError::StalePoll);
        }

        let (question, answers) = draft.into_parts();
        if answers.is_empty() {
            inner.reset();
            return Err(DomainError::EmptyPoll);
        }

        let deadline = Instant::now() + duration;
        inner.question = question;
        inner.options = answers
            .into_iter()
            .map(|answer| OptionTally { answer, votes: 0 })
            .collect();
        inner.deadline = Some(deadline);
        inner.state = PollState::Active;

        tracing::info!(
            generation = inner.generation,
            options = inner.options.len(),
            duration_secs = duration.as_secs(),
            "Poll opened"
        );

        Ok(OpenedPoll {
            generation: inner.generation,
            deadline,
            duration,
        })
    }

    /// Collecting -> Idle, when the creator went away mid-collection
    ///
    /// No-op unless the ticket's poll is still being collected.
    pub fn abandon(&self, ticket: PollTicket) -> bool {
        let mut inner = self.inner.lock();

        if !inner.is_live(ticket.generation, PollState::Collecting) {
            return false;
        }

        inner.reset();
        tracing::debug!(generation = ticket.generation, "Poll collection abandoned");
        true
    }

    /// The current question and answers, if a poll is accepting votes
    pub fn ballot(&self) -> DomainResult<Ballot> {
        let inner = self.inner.lock();

        if inner.state != PollState::Active {
            return Err(DomainError::NoActivePoll);
        }

        Ok(Ballot {
            generation: inner.generation,
            question: inner.question.clone(),
            answers: inner
                .options
                .iter()
                .map(|tally| tally.answer.clone())
                .collect(),
        })
    }

    /// Record one vote for a 1-based answer number
    ///
    /// `generation` is the poll the voter was shown; if that poll is no longer
    /// accepting votes the vote is refused. Votes are not deduplicated per voter.
    pub fn vote(&self, generation: u64, choice: &str) -> DomainResult<u64> {
        let mut inner = self.inner.lock();

        if !inner.is_live(generation, PollState::Active) {
            return Err(DomainError::NoActivePoll);
        }

        let index = choice
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=inner.options.len()).contains(n))
            .ok_or(DomainError::InvalidVote)?;

        let tally = &mut inner.options[index - 1];
        tally.votes += 1;
        let votes = tally.votes;

        tracing::debug!(generation, option = index, votes, "Vote recorded");

        Ok(votes)
    }

    /// Active -> Closed, producing the final tally
    ///
    /// Returns `None` if this generation is no longer Active.
    pub fn expire(&self, generation: u64) -> Option<PollResults> {
        let mut inner = self.inner.lock();

        if !inner.is_live(generation, PollState::Active) {
            return None;
        }

        inner.state = PollState::Closed;
        inner.deadline = None;

        tracing::info!(generation, "Poll closed");

        Some(PollResults {
            generation,
            question: inner.question.clone(),
            tallies: inner.options.clone(),
        })
    }

    /// Closed -> Idle, once the results have been announced
    ///
    /// Leaves the engine alone if a newer poll has started meanwhile.
    pub fn finish(&self, generation: u64) -> bool {
        let mut inner = self.inner.lock();

        if !inner.is_live(generation, PollState::Closed) {
            return false;
        }

        inner.reset();
        true
    }

    /// Current lifecycle state
    pub fn state(&self) -> PollState {
        self.inner.lock().state
    }

    /// Generation of the most recent poll (0 before the first one)
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Read-only view of the poll
    pub fn snapshot(&self) -> PollSnapshot {
        let inner = self.inner.lock();

        PollSnapshot {
            state: inner.state,
            generation: inner.generation,
            question: (inner.state != PollState::Idle && !inner.question.is_empty())
                .then(|| inner.question.clone()),
            options: inner.options.clone(),
            remaining_secs: inner
                .deadline
                .map(|deadline| deadline.saturating_duration_since(Instant::now()).as_secs()),
        }
    }
}

impl Default for PollEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PollEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("PollEngine")
            .field("state", &inner.state)
            .field("generation", &inner.generation)
            .finish()
    }
}
