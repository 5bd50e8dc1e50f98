//! Game identifiers used by tool calls and the arcade.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Every minigame the companion can open.
///
/// `Display` yields the canonical identifier advertised to the language
/// model; parsing also accepts the aliases older prompts used.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum GameKind {
    /// Memory match.
    #[strum(to_string = "memory")]
    Memory,
    /// Tic-tac-toe against a random opponent.
    #[strum(to_string = "tic-tac-toe", serialize = "tictactoe")]
    TicTacToe,
    /// Sudoku.
    #[strum(to_string = "sudoku")]
    Sudoku,
    /// Minesweeper.
    #[strum(to_string = "minesweeper")]
    Minesweeper,
    /// Riddle guessing.
    #[strum(to_string = "riddle")]
    Riddle,
    /// Hangman-style word guessing.
    #[strum(to_string = "stickman", serialize = "hangman", serialize = "word-guess")]
    WordGuess,
    /// Survey trivia.
    #[strum(to_string = "feud", serialize = "trivia", serialize = "mind-feud")]
    Feud,
    /// Timed debate.
    #[strum(to_string = "debate")]
    Debate,
    /// Connect the stars.
    #[strum(to_string = "connect-stars", serialize = "connect", serialize = "constellation")]
    ConnectStars,
}

impl GameKind {
    /// Canonical identifiers, in declaration order.
    pub fn identifiers() -> Vec<String> {
        Self::iter().map(|kind| kind.to_string()).collect()
    }

    /// Human-facing title.
    pub fn title(self) -> &'static str {
        match self {
            GameKind::Memory => "Memory Match",
            GameKind::TicTacToe => "Tic-Tac-Toe",
            GameKind::Sudoku => "Sudoku",
            GameKind::Minesweeper => "Minesweeper",
            GameKind::Riddle => "Riddle Me This",
            GameKind::WordGuess => "Stickman's Fate",
            GameKind::Feud => "Mind Feud",
            GameKind::Debate => "Debate Club",
            GameKind::ConnectStars => "Connect the Stars",
        }
    }

    /// Whether the game needs generated content before it can start.
    pub fn needs_content(self) -> bool {
        matches!(self, GameKind::Riddle | GameKind::Feud | GameKind::Debate)
    }
}
