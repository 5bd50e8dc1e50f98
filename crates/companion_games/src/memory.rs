//! Memory match: find every pair in a shuffled deck.
//!
//! A turn is two flips. A matching pair is recorded the moment the second
//! card turns up; the face-up pair is cleared by [`MemoryMatch::settle`],
//! which the front end calls after a short delay so mismatches can be seen.

use crate::error::MoveError;
use crate::status::{Engine, Status};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// Default card faces.
pub const DEFAULT_SYMBOLS: [&str; 8] = ["🌸", "🌙", "⭐", "🍀", "🦋", "🌊", "🔥", "🎵"];

/// Outcome of flipping the second card of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOutcome {
    /// Only one card is face-up so far.
    Pending,
    /// Both cards show the same symbol.
    Matched,
    /// The symbols differ; both flip back on `settle`.
    Mismatched,
}

/// Memory match engine.
#[derive(Debug, Clone)]
pub struct MemoryMatch {
    symbols: Vec<&'static str>,
    deck: Vec<&'static str>,
    face_up: Vec<usize>,
    matched: BTreeSet<&'static str>,
    moves: u32,
}

impl MemoryMatch {
    /// Deals a shuffled deck of the default symbols.
    #[instrument(skip(rng))]
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_symbols(&DEFAULT_SYMBOLS, rng)
    }

    /// Deals a shuffled deck holding each symbol twice.
    #[instrument(skip(rng))]
    pub fn with_symbols<R: Rng + ?Sized>(symbols: &[&'static str], rng: &mut R) -> Self {
        let mut deck: Vec<&'static str> = symbols.iter().chain(symbols.iter()).copied().collect();
        deck.shuffle(rng);
        debug!(pairs = symbols.len(), "Dealt memory deck");
        Self::from_deck(symbols.to_vec(), deck)
    }

    /// Uses a deck in the given order (no shuffle).
    pub fn from_deck(symbols: Vec<&'static str>, deck: Vec<&'static str>) -> Self {
        Self {
            symbols,
            deck,
            face_up: Vec::new(),
            matched: BTreeSet::new(),
            moves: 0,
        }
    }

    /// Card faces in deck order.
    pub fn deck(&self) -> &[&'static str] {
        &self.deck
    }

    /// Indices currently face-up (at most two).
    pub fn face_up(&self) -> &[usize] {
        &self.face_up
    }

    /// Symbols whose pair has been found.
    pub fn matched(&self) -> &BTreeSet<&'static str> {
        &self.matched
    }

    /// Number of flips so far.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Number of distinct symbols (pairs) in the deck.
    pub fn pairs(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the card at `index` is visible (face-up or matched).
    pub fn is_revealed(&self, index: usize) -> bool {
        self.face_up.contains(&index)
            || self
                .deck
                .get(index)
                .is_some_and(|symbol| self.matched.contains(symbol))
    }

    /// True while two cards wait to be settled.
    pub fn needs_settle(&self) -> bool {
        self.face_up.len() == 2
    }

    /// Turns a card face-up.
    #[instrument(skip(self))]
    pub fn flip(&mut self, index: usize) -> Result<PairOutcome, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        if self.face_up.len() >= 2 {
            return Err(MoveError::HandFull);
        }
        let symbol = *self
            .deck
            .get(index)
            .ok_or_else(|| MoveError::OutOfBounds(index.to_string()))?;
        if self.face_up.contains(&index) {
            return Err(MoveError::AlreadyTaken(format!("Card {index}")));
        }
        if self.matched.contains(symbol) {
            return Err(MoveError::AlreadyMatched(index));
        }

        self.face_up.push(index);
        self.moves += 1;

        if self.face_up.len() < 2 {
            return Ok(PairOutcome::Pending);
        }

        let first = self.deck[self.face_up[0]];
        if first == symbol {
            self.matched.insert(symbol);
            debug!(symbol, matched = self.matched.len(), "Pair matched");
            if self.is_over() {
                info!(moves = self.moves, "Memory match completed");
            }
            Ok(PairOutcome::Matched)
        } else {
            debug!(first, second = symbol, "Pair mismatched");
            Ok(PairOutcome::Mismatched)
        }
    }

    /// Clears the face-up pair. Matched cards stay visible through the
    /// matched set.
    #[instrument(skip(self))]
    pub fn settle(&mut self) {
        self.face_up.clear();
    }

    /// Reshuffles and starts over.
    #[instrument(skip(self, rng))]
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let symbols = self.symbols.clone();
        *self = Self::with_symbols(&symbols, rng);
    }
}

impl Engine for MemoryMatch {
    fn status(&self) -> Status {
        if self.matched.len() == self.symbols.len() {
            Status::Won
        } else {
            Status::InProgress
        }
    }
}
