//! Command-line interface for the companion.

use clap::{Parser, Subcommand};
use companion::Persona;
use companion_games::GameKind;
use std::path::PathBuf;

/// Companion - a gentle chat partner with minigames
#[derive(Parser, Debug)]
#[command(name = "companion")]
#[command(about = "Conversational companion with tool-calling chat and minigames", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = "companion.toml")]
    pub config: PathBuf,

    /// Override the model name
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Override the persona (zen-companion, creative-muse, witty-pal, wise-sage)
    #[arg(long, global = true)]
    pub persona: Option<Persona>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Chat in the terminal; games and music the companion opens are shown inline
    Chat,

    /// Play a minigame in the terminal
    Play {
        /// Game to play (memory, tic-tac-toe, sudoku, minesweeper, riddle, stickman, feud, debate, connect-stars)
        game: GameKind,
    },

    /// Solve a generated riddle
    Riddle,

    /// Play a round of survey trivia
    Feud,

    /// Debate a generated topic against the clock
    Debate,

    /// Suggest songs for a mood
    Songs {
        /// How you are feeling
        mood: String,
    },

    /// Print a short insight for the day
    Wisdom,
}
