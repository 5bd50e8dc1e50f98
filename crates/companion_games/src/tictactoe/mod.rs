//! Tic-tac-toe against a naive random opponent.

mod position;
mod rules;
mod types;

pub use position::Position;
pub use rules::{TicTacToe, check_winner};
pub use types::{Board, GameStatus, Player, Square};
