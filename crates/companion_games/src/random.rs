//! Uniform-random legal move selection.
//!
//! Any engine that can enumerate its legal moves gets a naive random
//! opponent for free.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};

/// Enumerates the moves currently legal for the side to move.
pub trait LegalMoves {
    /// Move type for this game.
    type Move: Copy + std::fmt::Debug;

    /// All legal moves in a stable order.
    fn legal_moves(&self) -> Vec<Self::Move>;
}

/// Picks one legal move uniformly at random, or `None` if there is none.
#[instrument(skip(game, rng))]
pub fn random_legal_move<G, R>(game: &G, rng: &mut R) -> Option<G::Move>
where
    G: LegalMoves + ?Sized,
    R: Rng + ?Sized,
{
    let moves = game.legal_moves();
    let choice = moves.choose(rng).copied();
    debug!(options = moves.len(), ?choice, "Picked random legal move");
    choice
}
