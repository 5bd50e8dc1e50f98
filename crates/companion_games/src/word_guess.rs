//! Hangman-style word guessing ("Stickman's Fate").

use crate::error::MoveError;
use crate::status::{Engine, Status};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, instrument};

/// Words the secret is drawn from.
pub const WORDS: [&str; 10] = [
    "Hope", "Dream", "Peace", "Love", "Courage", "Serenity", "Kindness", "Joy", "Grace", "Believe",
];

/// Wrong guesses allowed before the round is lost.
pub const MAX_WRONG_GUESSES: usize = 6;

/// Figure parts drawn per wrong guess, in order.
pub const FIGURE_PARTS: [&str; MAX_WRONG_GUESSES] =
    ["head", "body", "right arm", "left arm", "right leg", "left leg"];

/// Word-guess engine.
#[derive(Debug, Clone)]
pub struct WordGuess {
    secret: String,
    guessed: Vec<char>,
}

impl WordGuess {
    /// Picks a secret word uniformly from [`WORDS`].
    #[instrument(skip(rng))]
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let secret = WORDS.choose(rng).copied().unwrap_or(WORDS[0]);
        Self::with_secret(secret)
    }

    /// Starts with a known secret word.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            guessed: Vec::new(),
        }
    }

    /// The secret word as written.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Guessed letters in order, lowercased.
    pub fn guessed(&self) -> &[char] {
        &self.guessed
    }

    /// Guessed letters that are not in the secret.
    pub fn wrong_count(&self) -> usize {
        let secret = self.secret.to_lowercase();
        self.guessed.iter().filter(|g| !secret.contains(**g)).count()
    }

    /// Figure stage, one part per wrong guess.
    pub fn stage(&self) -> usize {
        self.wrong_count().min(MAX_WRONG_GUESSES)
    }

    /// Figure parts drawn so far.
    pub fn figure(&self) -> &'static [&'static str] {
        &FIGURE_PARTS[..self.stage()]
    }

    /// The secret with unguessed letters shown as `_`.
    pub fn masked_word(&self) -> String {
        self.secret
            .chars()
            .map(|ch| {
                if self.guessed.contains(&ch.to_ascii_lowercase()) {
                    ch
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Guesses one letter (case-insensitive).
    #[instrument(skip(self))]
    pub fn guess_letter(&mut self, letter: char) -> Result<bool, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        if !letter.is_ascii_alphabetic() {
            return Err(MoveError::InvalidInput(letter.to_string()));
        }
        let letter = letter.to_ascii_lowercase();
        if self.guessed.contains(&letter) {
            return Err(MoveError::AlreadyGuessed(letter.to_string()));
        }

        self.guessed.push(letter);
        let hit = self.secret.to_lowercase().contains(letter);
        debug!(%letter, hit, wrong = self.wrong_count(), "Letter guessed");

        match self.status() {
            Status::Won => info!(secret = %self.secret, "Word guessed"),
            Status::Lost => info!(secret = %self.secret, "Out of guesses"),
            _ => {}
        }
        Ok(hit)
    }

    /// Picks a new secret and clears guesses.
    #[instrument(skip(self, rng))]
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        *self = Self::new(rng);
    }
}

impl Engine for WordGuess {
    fn status(&self) -> Status {
        let solved = self
            .secret
            .chars()
            .all(|ch| self.guessed.contains(&ch.to_ascii_lowercase()));
        if solved {
            Status::Won
        } else if self.wrong_count() >= MAX_WRONG_GUESSES {
            Status::Lost
        } else {
            Status::InProgress
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_game_wins_with_no_wrong_guesses() {
        let mut game = WordGuess::with_secret("Peace");
        for letter in ['p', 'e', 'a', 'c'] {
            assert!(game.guess_letter(letter).unwrap());
        }
        assert_eq!(game.status(), Status::Won);
        assert_eq!(game.wrong_count(), 0);
        assert_eq!(game.masked_word(), "Peace");
    }

    #[test]
    fn six_misses_lose() {
        let mut game = WordGuess::with_secret("Peace");
        for letter in ['z', 'x', 'q', 'w', 'u', 'i'] {
            assert!(!game.guess_letter(letter).unwrap());
        }
        assert_eq!(game.status(), Status::Lost);
        assert_eq!(game.stage(), MAX_WRONG_GUESSES);
        assert_eq!(game.guess_letter('p'), Err(MoveError::GameOver));
    }

    #[test]
    fn guesses_are_case_insensitive_and_unique() {
        let mut game = WordGuess::with_secret("Hope");
        game.guess_letter('H').unwrap();
        assert_eq!(game.guess_letter('h'), Err(MoveError::AlreadyGuessed("h".into())));
        assert_eq!(game.masked_word(), "H___");
    }

    #[test]
    fn non_letters_rejected() {
        let mut game = WordGuess::with_secret("Joy");
        assert!(game.guess_letter('3').is_err());
        assert!(game.guessed().is_empty());
    }

    #[test]
    fn stage_tracks_wrong_guesses() {
        let mut game = WordGuess::with_secret("Joy");
        game.guess_letter('a').unwrap();
        game.guess_letter('j').unwrap();
        game.guess_letter('b').unwrap();
        assert_eq!(game.stage(), 2);
        assert_eq!(game.figure(), &["head", "body"]);
    }
}
