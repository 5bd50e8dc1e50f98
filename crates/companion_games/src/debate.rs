//! Timed debate against a generated opponent.
//!
//! The opponent's rebuttal is produced asynchronously by the content
//! adapter. [`Debate::submit_argument`] hands out a [`RebuttalTicket`] and
//! [`Debate::receive_rebuttal`] only accepts tickets from the current
//! debate, so a rebuttal that arrives after a restart is dropped.

use crate::content::DebateTurn;
use crate::error::MoveError;
use crate::status::{Engine, Status};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Ticks a debate lasts.
pub const DEBATE_SECONDS: u32 = 90;

/// Side the player argues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum Side {
    /// In favour of the topic.
    For,
    /// Against the topic.
    Against,
}

/// Whose move it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Turn {
    /// Waiting for the player's argument.
    User,
    /// Waiting for the opponent's rebuttal.
    Opponent,
    /// Time ran out.
    Ended,
}

/// One argument and its rebuttal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    /// The player's argument.
    pub argument: String,
    /// The opponent's reply, once received.
    pub rebuttal: Option<String>,
}

/// Claim on the pending rebuttal of one debate instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuttalTicket {
    epoch: u64,
}

/// Debate engine.
#[derive(Debug, Clone)]
pub struct Debate {
    topic: String,
    opening: String,
    side: Side,
    turn: Turn,
    remaining: u32,
    history: Vec<Exchange>,
    epoch: u64,
}

impl Debate {
    /// Opens a debate from the opponent's opening turn, picking a side at random.
    #[instrument(skip(opening, rng), fields(topic = %opening.topic))]
    pub fn new<R: Rng + ?Sized>(opening: DebateTurn, rng: &mut R) -> Self {
        let side = if rng.gen_bool(0.5) { Side::For } else { Side::Against };
        Self::with_side(opening, side)
    }

    /// Opens a debate with a fixed side.
    pub fn with_side(opening: DebateTurn, side: Side) -> Self {
        Self {
            topic: opening.topic,
            opening: opening.response,
            side,
            turn: Turn::User,
            remaining: DEBATE_SECONDS,
            history: Vec::new(),
            epoch: 0,
        }
    }

    /// Debate topic.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Opponent's opening statement.
    pub fn opening(&self) -> &str {
        &self.opening
    }

    /// Side the player argues.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Whose move it is.
    pub fn turn(&self) -> Turn {
        self.turn
    }

    /// Ticks left on the clock.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Exchanges so far.
    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    /// Submits the player's argument and hands the turn to the opponent.
    #[instrument(skip(self, text))]
    pub fn submit_argument(&mut self, text: &str) -> Result<RebuttalTicket, MoveError> {
        match self.turn {
            Turn::Ended => return Err(MoveError::GameOver),
            Turn::Opponent => return Err(MoveError::NotYourTurn),
            Turn::User => {}
        }
        if self.remaining == 0 {
            return Err(MoveError::GameOver);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(MoveError::InvalidInput("empty argument".into()));
        }

        self.history.push(Exchange {
            argument: text.to_string(),
            rebuttal: None,
        });
        self.turn = Turn::Opponent;
        debug!(exchanges = self.history.len(), "Argument submitted");
        Ok(RebuttalTicket { epoch: self.epoch })
    }

    /// Records the opponent's rebuttal for the pending exchange.
    #[instrument(skip(self, text))]
    pub fn receive_rebuttal(
        &mut self,
        ticket: RebuttalTicket,
        text: impl Into<String>,
    ) -> Result<(), MoveError> {
        if ticket.epoch != self.epoch {
            warn!(ticket = ticket.epoch, current = self.epoch, "Dropping stale rebuttal");
            return Err(MoveError::StaleTicket {
                got: ticket.epoch,
                current: self.epoch,
            });
        }
        let pending = self
            .history
            .last_mut()
            .filter(|exchange| exchange.rebuttal.is_none())
            .ok_or(MoveError::NotYourTurn)?;
        pending.rebuttal = Some(text.into());
        if self.turn == Turn::Opponent {
            self.turn = Turn::User;
        }
        debug!(turn = ?self.turn, "Rebuttal received");
        Ok(())
    }

    /// Advances the clock by one tick; at zero the debate ends.
    pub fn tick(&mut self) {
        if self.turn == Turn::Ended {
            return;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            info!(exchanges = self.history.len(), "Debate time is up");
            self.turn = Turn::Ended;
        }
    }

    /// Starts a new debate; outstanding tickets become stale.
    #[instrument(skip(self, opening, rng))]
    pub fn restart<R: Rng + ?Sized>(&mut self, opening: DebateTurn, rng: &mut R) {
        let epoch = self.epoch + 1;
        *self = Self::new(opening, rng);
        self.epoch = epoch;
    }

    /// Transcript as `(argument, rebuttal)` pairs for the content adapter,
    /// led by the opening statement.
    pub fn transcript(&self) -> Vec<(String, String)> {
        std::iter::once(("Let's begin.".to_string(), self.opening.clone()))
            .chain(self.history.iter().map(|exchange| {
                (
                    exchange.argument.clone(),
                    exchange.rebuttal.clone().unwrap_or_else(|| "...".to_string()),
                )
            }))
            .collect()
    }
}

impl Engine for Debate {
    /// A debate has no winner; it is simply over once time runs out.
    fn status(&self) -> Status {
        if self.turn == Turn::Ended {
            Status::Draw
        } else {
            Status::InProgress
        }
    }
}
