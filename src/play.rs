//! Terminal moves: one line of input becomes one engine transition.

use crate::arcade::ActiveGame;
use companion_games::{MoveError, Position};
use rand::Rng;
use tracing::{debug, instrument};

fn invalid(input: &str) -> MoveError {
    MoveError::InvalidInput(input.to_string())
}

/// Parses whitespace-separated 1-based numbers.
fn numbers(input: &str) -> Result<Vec<usize>, MoveError> {
    input
        .split_whitespace()
        .map(|token| {
            token
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid(token))
        })
        .collect()
}

/// Applies a line of player input to a game.
///
/// Inputs per game:
/// - memory: card number
/// - tic-tac-toe: square number or label ("center")
/// - sudoku: `row col digit`, digit `0` clears
/// - minesweeper: `row col` reveals, `f row col` flags
/// - riddle and feud: the guess
/// - stickman: one letter
/// - connect-stars: star number
///
/// Debate arguments need a rebuttal and are handled by the caller.
#[instrument(skip(game, rng), fields(kind = %game.kind()))]
pub fn apply_input<R: Rng + ?Sized>(
    game: &mut ActiveGame,
    input: &str,
    rng: &mut R,
) -> Result<(), MoveError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(invalid(input));
    }

    match game {
        ActiveGame::Memory(g) => match numbers(input)?.as_slice() {
            [n] => g.flip(n - 1).map(|outcome| debug!(?outcome, "Flipped")),
            _ => Err(invalid(input)),
        },
        ActiveGame::TicTacToe(g) => {
            let pos = Position::parse(input).ok_or_else(|| invalid(input))?;
            g.apply_move(pos)
        }
        ActiveGame::Sudoku(g) => match numbers_allowing_zero(input)?.as_slice() {
            [r, c, d] if *r > 0 && *c > 0 && *d <= 9 => {
                g.select_cell(r - 1, c - 1)?;
                match *d {
                    0 => g.clear_value(),
                    d => g.set_value(d as u8),
                }
            }
            _ => Err(invalid(input)),
        },
        ActiveGame::Minesweeper(g) => {
            let (flag, rest) = match input.strip_prefix(['f', 'F']) {
                Some(rest) => (true, rest),
                None => (false, input),
            };
            match numbers(rest)?.as_slice() {
                [r, c] if flag => g.toggle_flag(r - 1, c - 1).map(|_| ()),
                [r, c] => g.reveal(r - 1, c - 1, rng).map(|_| ()),
                _ => Err(invalid(input)),
            }
        }
        ActiveGame::Riddle(g) => g.guess(input).map(|correct| debug!(correct, "Riddle guess")),
        ActiveGame::WordGuess(g) => {
            let mut chars = input.chars();
            match (chars.next(), chars.next()) {
                (Some(letter), None) => g.guess_letter(letter).map(|_| ()),
                _ => Err(invalid(input)),
            }
        }
        ActiveGame::Feud(g) => g.submit_guess(input).map(|outcome| debug!(?outcome, "Feud guess")),
        ActiveGame::ConnectStars(g) => {
            let id = input.parse::<u32>().map_err(|_| invalid(input))?;
            g.select_point(id)
        }
        ActiveGame::Debate(_) => Err(MoveError::InvalidInput(
            "debate arguments need an opponent".to_string(),
        )),
    }
}

fn numbers_allowing_zero(input: &str) -> Result<Vec<usize>, MoveError> {
    input
        .split_whitespace()
        .map(|token| token.parse::<usize>().map_err(|_| invalid(token)))
        .collect()
}
