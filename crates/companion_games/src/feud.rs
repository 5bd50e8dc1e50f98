//! Survey trivia ("Mind Feud"): uncover ranked answers before three strikes.

use crate::content::{MAX_FEUD_ANSWERS, TriviaSet};
use crate::error::MoveError;
use crate::status::{Engine, Status};
use tracing::{debug, info, instrument};

/// Strikes that end the round.
pub const MAX_STRIKES: u32 = 3;

/// An answer slot on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSlot {
    /// Answer text.
    pub answer: String,
    /// Points awarded when revealed.
    pub points: u32,
    /// Whether the player has found it.
    pub revealed: bool,
}

/// Result of a guess that was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Revealed the answer at this slot.
    Hit {
        /// Slot index.
        slot: usize,
        /// Points gained.
        points: u32,
    },
    /// No answer matched; a strike was added.
    Strike(u32),
}

/// Feud engine.
#[derive(Debug, Clone)]
pub struct Feud {
    question: String,
    answers: Vec<AnswerSlot>,
    strikes: u32,
    score: u32,
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

impl Feud {
    /// Builds a board from generated trivia, keeping at most five answers.
    #[instrument(skip(set), fields(question = %set.question))]
    pub fn new(set: TriviaSet) -> Self {
        let set = set.truncated();
        debug!(answers = set.answers.len(), "Feud board ready");
        Self {
            question: set.question,
            answers: set
                .answers
                .into_iter()
                .take(MAX_FEUD_ANSWERS)
                .map(|a| AnswerSlot {
                    answer: a.answer,
                    points: a.points,
                    revealed: false,
                })
                .collect(),
            strikes: 0,
            score: 0,
        }
    }

    /// Survey question.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Answer slots as the player has uncovered them.
    pub fn answers(&self) -> &[AnswerSlot] {
        &self.answers
    }

    /// Slots to show on screen: after a loss every answer is shown, but the
    /// engine's own `revealed` flags are left untouched.
    pub fn answers_for_display(&self) -> Vec<AnswerSlot> {
        let show_all = self.status() == Status::Lost;
        self.answers
            .iter()
            .cloned()
            .map(|mut slot| {
                slot.revealed |= show_all;
                slot
            })
            .collect()
    }

    /// Strikes so far.
    pub fn strikes(&self) -> u32 {
        self.strikes
    }

    /// Points collected.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Checks a guess against the hidden answers.
    #[instrument(skip(self))]
    pub fn submit_guess(&mut self, text: &str) -> Result<GuessOutcome, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        let guess = normalize(text);
        if guess.is_empty() {
            return Err(MoveError::InvalidInput("empty guess".into()));
        }

        let hidden = self
            .answers
            .iter()
            .position(|a| !a.revealed && normalize(&a.answer) == guess);
        if let Some(slot) = hidden {
            let answer = &mut self.answers[slot];
            answer.revealed = true;
            let points = answer.points;
            self.score += points;
            debug!(slot, points, score = self.score, "Answer revealed");
            if self.status() == Status::Won {
                info!(score = self.score, "Feud board cleared");
            }
            return Ok(GuessOutcome::Hit { slot, points });
        }
        if let Some(shown) = self.answers.iter().find(|a| normalize(&a.answer) == guess) {
            return Err(MoveError::AlreadyGuessed(shown.answer.clone()));
        }

        self.strikes += 1;
        debug!(strikes = self.strikes, "Strike");
        if self.strikes >= MAX_STRIKES {
            info!(score = self.score, "Feud round lost");
        }
        Ok(GuessOutcome::Strike(self.strikes))
    }
}

impl Engine for Feud {
    fn status(&self) -> Status {
        if !self.answers.is_empty() && self.answers.iter().all(|a| a.revealed) {
            Status::Won
        } else if self.strikes >= MAX_STRIKES {
            Status::Lost
        } else {
            Status::InProgress
        }
    }
}
