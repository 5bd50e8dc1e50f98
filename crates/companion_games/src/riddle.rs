//! Riddle guessing with forgiving answer matching.

use crate::content::Riddle;
use crate::error::MoveError;
use crate::status::{Engine, Status};
use tracing::{debug, instrument};

const PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`', '~',
    '(', ')',
];

/// Lowercases and strips punctuation so "A Piano!" matches "a piano".
pub fn normalize_answer(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|ch| !PUNCTUATION.contains(ch))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Riddle engine.
#[derive(Debug, Clone)]
pub struct RiddleGame {
    riddle: Riddle,
    solved: bool,
    attempts: u32,
}

impl RiddleGame {
    /// Poses a riddle.
    pub fn new(riddle: Riddle) -> Self {
        Self {
            riddle,
            solved: false,
            attempts: 0,
        }
    }

    /// Riddle text.
    pub fn riddle(&self) -> &str {
        &self.riddle.riddle
    }

    /// The answer, only once solved.
    pub fn answer(&self) -> Option<&str> {
        self.solved.then_some(self.riddle.answer.as_str())
    }

    /// Guesses made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Checks a guess. A guess is correct when either normalised text
    /// contains the other.
    #[instrument(skip(self))]
    pub fn guess(&mut self, text: &str) -> Result<bool, MoveError> {
        if self.solved {
            return Err(MoveError::GameOver);
        }
        let guess = normalize_answer(text);
        if guess.is_empty() {
            return Err(MoveError::InvalidInput("empty guess".into()));
        }
        self.attempts += 1;
        let answer = normalize_answer(&self.riddle.answer);
        let correct = answer.contains(&guess) || guess.contains(&answer);
        debug!(correct, attempts = self.attempts, "Riddle guess");
        self.solved = correct;
        Ok(correct)
    }
}

impl Engine for RiddleGame {
    fn status(&self) -> Status {
        if self.solved {
            Status::Won
        } else {
            Status::InProgress
        }
    }
}
