//! Companion minigames - pure turn-based engines
//!
//! Every game is an explicit state machine: transitions are methods that
//! either apply a move or return a [`MoveError`] and leave the state as it
//! was. Nothing here performs I/O or sleeps; fixed delays and clocks are
//! driven from outside through methods such as `settle`, `play_opponent`
//! and `tick`.
//!
//! # Example
//!
//! ```
//! use companion_games::{Engine, Position, Status, TicTacToe};
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let mut game = TicTacToe::new();
//! game.apply_move(Position::Center).unwrap();
//! game.play_opponent(&mut rng).unwrap();
//! assert_eq!(game.status(), Status::InProgress);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod constellation;
mod content;
mod debate;
mod error;
mod feud;
mod kind;
mod memory;
mod minesweeper;
mod random;
mod riddle;
mod status;
mod sudoku;
mod tictactoe;
mod word_guess;

// Shared vocabulary
pub use error::MoveError;
pub use kind::GameKind;
pub use random::{LegalMoves, random_legal_move};
pub use status::{Engine, Status};

// Generated content records
pub use content::{
    DebateTurn, MAX_FEUD_ANSWERS, Riddle, Song, SongList, TriviaAnswer, TriviaSet,
};

// Engines
pub use constellation::{Constellation, Segment, Star};
pub use debate::{DEBATE_SECONDS, Debate, Exchange, RebuttalTicket, Side, Turn};
pub use feud::{AnswerSlot, Feud, GuessOutcome, MAX_STRIKES};
pub use memory::{DEFAULT_SYMBOLS, MemoryMatch, PairOutcome};
pub use minesweeper::{
    Cell, Coord, DEFAULT_COLS, DEFAULT_MINES, DEFAULT_ROWS, FieldError, Minefield,
};
pub use riddle::{RiddleGame, normalize_answer};
pub use sudoku::{EXAMPLE_PUZZLE, EXAMPLE_SOLUTION, Grid, Sudoku};
pub use tictactoe::{Board, GameStatus, Player, Position, Square, TicTacToe, check_winner};
pub use word_guess::{FIGURE_PARTS, MAX_WRONG_GUESSES, WORDS, WordGuess};
