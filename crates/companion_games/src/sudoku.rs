//! Sudoku checked against a known solution.

use crate::error::MoveError;
use crate::status::{Engine, Status};
use tracing::{debug, info, instrument};

/// A 9×9 grid; `0` marks an empty cell.
pub type Grid = [[u8; 9]; 9];

/// Bundled example puzzle.
pub const EXAMPLE_PUZZLE: Grid = [
    [5, 3, 0, 0, 7, 0, 0, 0, 0],
    [6, 0, 0, 1, 9, 5, 0, 0, 0],
    [0, 9, 8, 0, 0, 0, 0, 6, 0],
    [8, 0, 0, 0, 6, 0, 0, 0, 3],
    [4, 0, 0, 8, 0, 3, 0, 0, 1],
    [7, 0, 0, 0, 2, 0, 0, 0, 6],
    [0, 6, 0, 0, 0, 0, 2, 8, 0],
    [0, 0, 0, 4, 1, 9, 0, 0, 5],
    [0, 0, 0, 0, 8, 0, 0, 7, 9],
];

/// Solution of [`EXAMPLE_PUZZLE`].
pub const EXAMPLE_SOLUTION: Grid = [
    [5, 3, 4, 6, 7, 8, 9, 1, 2],
    [6, 7, 2, 1, 9, 5, 3, 4, 8],
    [1, 9, 8, 3, 4, 2, 5, 6, 7],
    [8, 5, 9, 7, 6, 1, 4, 2, 3],
    [4, 2, 6, 8, 5, 3, 7, 9, 1],
    [7, 1, 3, 9, 2, 4, 8, 5, 6],
    [9, 6, 1, 5, 3, 7, 2, 8, 4],
    [2, 8, 7, 4, 1, 9, 6, 3, 5],
    [3, 4, 5, 2, 8, 6, 1, 7, 9],
];

/// Sudoku engine.
///
/// Wrong digits are accepted and only flagged; completion is exact equality
/// with the solution and is re-evaluated after every edit, so a finished grid
/// becomes unfinished again if a cell is changed.
#[derive(Debug, Clone)]
pub struct Sudoku {
    puzzle: Grid,
    solution: Grid,
    grid: Grid,
    selected: Option<(usize, usize)>,
    complete: bool,
}

impl Sudoku {
    /// Starts the bundled example puzzle.
    pub fn example() -> Self {
        Self::new(EXAMPLE_PUZZLE, EXAMPLE_SOLUTION)
    }

    /// Starts a puzzle with its solution.
    #[instrument(skip_all)]
    pub fn new(puzzle: Grid, solution: Grid) -> Self {
        Self {
            puzzle,
            solution,
            grid: puzzle,
            selected: None,
            complete: puzzle == solution,
        }
    }

    /// Current working grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Currently selected cell.
    pub fn selected(&self) -> Option<(usize, usize)> {
        self.selected
    }

    /// Whether `(r, c)` belongs to the puzzle.
    pub fn is_given(&self, r: usize, c: usize) -> bool {
        r < 9 && c < 9 && self.puzzle[r][c] != 0
    }

    /// Whether the filled value at `(r, c)` disagrees with the solution.
    pub fn is_incorrect(&self, r: usize, c: usize) -> bool {
        r < 9 && c < 9 && self.grid[r][c] != 0 && self.grid[r][c] != self.solution[r][c]
    }

    /// Whether the grid equals the solution.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Selects a non-given cell for input.
    #[instrument(skip(self))]
    pub fn select_cell(&mut self, r: usize, c: usize) -> Result<(), MoveError> {
        if r >= 9 || c >= 9 {
            return Err(MoveError::OutOfBounds(format!("({r}, {c})")));
        }
        if self.is_given(r, c) {
            return Err(MoveError::GivenCell(r, c));
        }
        self.selected = Some((r, c));
        Ok(())
    }

    /// Writes a digit into the selected cell.
    #[instrument(skip(self))]
    pub fn set_value(&mut self, digit: u8) -> Result<(), MoveError> {
        if !(1..=9).contains(&digit) {
            return Err(MoveError::InvalidInput(format!("digit {digit}")));
        }
        self.write(digit)
    }

    /// Empties the selected cell.
    #[instrument(skip(self))]
    pub fn clear_value(&mut self) -> Result<(), MoveError> {
        self.write(0)
    }

    /// Restores the original puzzle.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.grid = self.puzzle;
        self.selected = None;
        self.complete = self.puzzle == self.solution;
    }

    /// Formats the grid with `.` for empty cells and box separators.
    pub fn display(&self) -> String {
        let mut out = String::new();
        for (r, row) in self.grid.iter().enumerate() {
            if r > 0 && r % 3 == 0 {
                out.push_str("------+-------+------\n");
            }
            for (c, value) in row.iter().enumerate() {
                if c > 0 && c % 3 == 0 {
                    out.push_str("| ");
                }
                if *value == 0 {
                    out.push('.');
                } else {
                    out.push(char::from(b'0' + value));
                }
                if c < 8 {
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        out
    }

    fn write(&mut self, value: u8) -> Result<(), MoveError> {
        let (r, c) = self.selected.ok_or(MoveError::NoSelection)?;
        self.grid[r][c] = value;
        self.complete = self.grid == self.solution;
        debug!(row = r, col = c, value, incorrect = self.is_incorrect(r, c), "Cell written");
        if self.complete {
            info!("Sudoku solved");
        }
        Ok(())
    }
}

impl Default for Sudoku {
    fn default() -> Self {
        Self::example()
    }
}

impl Engine for Sudoku {
    fn status(&self) -> Status {
        if self.complete {
            Status::Won
        } else {
            Status::InProgress
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blanks() -> Vec<(usize, usize)> {
        (0..9)
            .flat_map(|r| (0..9).map(move |c| (r, c)))
            .filter(|&(r, c)| EXAMPLE_PUZZLE[r][c] == 0)
            .collect()
    }

    #[test]
    fn example_solution_is_consistent_with_puzzle() {
        for r in 0..9 {
            for c in 0..9 {
                if EXAMPLE_PUZZLE[r][c] != 0 {
                    assert_eq!(EXAMPLE_PUZZLE[r][c], EXAMPLE_SOLUTION[r][c]);
                }
            }
        }
    }

    #[test]
    fn givens_cannot_be_selected() {
        let mut game = Sudoku::example();
        assert_eq!(game.select_cell(0, 0), Err(MoveError::GivenCell(0, 0)));
        assert!(game.select_cell(0, 2).is_ok());
    }

    #[test]
    fn set_without_selection_rejected() {
        let mut game = Sudoku::example();
        assert_eq!(game.set_value(4), Err(MoveError::NoSelection));
    }

    #[test]
    fn wrong_digit_is_kept_but_flagged() {
        let mut game = Sudoku::example();
        game.select_cell(0, 2).unwrap();
        game.set_value(1).unwrap();
        assert_eq!(game.grid()[0][2], 1);
        assert!(game.is_incorrect(0, 2));
        game.set_value(4).unwrap();
        assert!(!game.is_incorrect(0, 2));
    }

    #[test]
    fn solving_completes_and_breaking_uncompletes() {
        let mut game = Sudoku::example();
        for (r, c) in blanks() {
            game.select_cell(r, c).unwrap();
            game.set_value(EXAMPLE_SOLUTION[r][c]).unwrap();
        }
        assert!(game.is_complete());
        assert_eq!(game.status(), Status::Won);

        let (r, c) = blanks()[0];
        game.select_cell(r, c).unwrap();
        let wrong = EXAMPLE_SOLUTION[r][c] % 9 + 1;
        game.set_value(wrong).unwrap();
        assert!(!game.is_complete());
        assert_eq!(game.status(), Status::InProgress);
    }

    #[test]
    fn reset_restores_puzzle() {
        let mut game = Sudoku::example();
        game.select_cell(0, 2).unwrap();
        game.set_value(4).unwrap();
        game.reset();
        assert_eq!(game.grid(), &EXAMPLE_PUZZLE);
        assert_eq!(game.selected(), None);
    }
}
