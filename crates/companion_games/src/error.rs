//! Rejected-move errors shared by every engine.
//!
//! A rejected move never changes engine state. Front ends treat these as
//! silent no-ops and only log them.

/// Reason a move was rejected.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The game already reached a terminal state.
    #[display("Game is already over")]
    GameOver,

    /// It is not the mover's turn.
    #[display("It's not your turn")]
    NotYourTurn,

    /// A coordinate or index was outside the board.
    #[display("Position {} is out of bounds", _0)]
    OutOfBounds(String),

    /// The square or cell is already occupied or revealed.
    #[display("{} is already taken", _0)]
    AlreadyTaken(String),

    /// The cell is flagged and cannot be revealed.
    #[display("Cell ({}, {}) is flagged", _0, _1)]
    Flagged(usize, usize),

    /// Two cards are already face-up.
    #[display("Two cards are already face-up")]
    HandFull,

    /// The symbol at this index has already been matched.
    #[display("Card {} is already matched", _0)]
    AlreadyMatched(usize),

    /// The letter or answer was already guessed.
    #[display("'{}' was already guessed", _0)]
    AlreadyGuessed(String),

    /// The input was empty or not a valid token for this game.
    #[display("Invalid input: {}", _0)]
    InvalidInput(String),

    /// The sudoku cell is part of the puzzle and cannot change.
    #[display("Cell ({}, {}) is a given", _0, _1)]
    GivenCell(usize, usize),

    /// No cell is selected.
    #[display("No cell selected")]
    NoSelection,

    /// The point is not the next one in sequence.
    #[display("Point {} is out of order (expected {})", got, expected)]
    OutOfOrder {
        /// Point that was selected.
        got: u32,
        /// Point that would have been accepted.
        expected: u32,
    },

    /// A result arrived for a game instance that has since been restarted.
    #[display("Stale result for epoch {} (current {})", got, current)]
    StaleTicket {
        /// Epoch carried by the ticket.
        got: u64,
        /// Current epoch of the engine.
        current: u64,
    },
}

impl std::error::Error for MoveError {}
