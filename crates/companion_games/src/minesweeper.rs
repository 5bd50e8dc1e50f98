//! Minesweeper with deferred mine placement and iterative flood fill.

use crate::error::MoveError;
use crate::status::{Engine, Status};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Default board height.
pub const DEFAULT_ROWS: usize = 10;
/// Default board width.
pub const DEFAULT_COLS: usize = 10;
/// Default mine count.
pub const DEFAULT_MINES: usize = 12;

/// A grid coordinate as `(row, col)`.
pub type Coord = (usize, usize);

/// One cell of the minefield.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Cell hides a mine.
    pub is_mine: bool,
    /// Cell has been uncovered.
    pub is_revealed: bool,
    /// Cell carries a flag.
    pub is_flagged: bool,
    /// Mines among the up-to-8 neighbours.
    pub adjacent_mines: u8,
}

/// Invalid board dimensions.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Invalid minefield {}x{} with {} mines", rows, cols, mines)]
pub struct FieldError {
    /// Requested rows.
    pub rows: usize,
    /// Requested columns.
    pub cols: usize,
    /// Requested mines.
    pub mines: usize,
}

/// Minesweeper engine.
#[derive(Debug, Clone)]
pub struct Minefield {
    rows: usize,
    cols: usize,
    mines: usize,
    cells: Vec<Cell>,
    mines_placed: bool,
    started: bool,
    status: Status,
    elapsed: u32,
}

impl Minefield {
    /// Creates an empty field; mines are placed on the first reveal.
    ///
    /// At least one cell must stay mine-free for the first click.
    #[instrument]
    pub fn new(rows: usize, cols: usize, mines: usize) -> Result<Self, FieldError> {
        if rows == 0 || cols == 0 || mines >= rows * cols {
            warn!(rows, cols, mines, "Rejected minefield dimensions");
            return Err(FieldError { rows, cols, mines });
        }
        Ok(Self {
            rows,
            cols,
            mines,
            cells: vec![Cell::default(); rows * cols],
            mines_placed: false,
            started: false,
            status: Status::InProgress,
            elapsed: 0,
        })
    }

    /// Builds a field with mines at fixed coordinates.
    #[instrument(skip(mines))]
    pub fn with_mines(rows: usize, cols: usize, mines: &[Coord]) -> Result<Self, FieldError> {
        let mut field = Self::new(rows, cols, mines.len())?;
        for &(r, c) in mines {
            if r >= rows || c >= cols {
                return Err(FieldError { rows, cols, mines: mines.len() });
            }
            let idx = field.index(r, c);
            field.cells[idx].is_mine = true;
        }
        field.mines = field.cells.iter().filter(|cell| cell.is_mine).count();
        field.compute_adjacency();
        field.mines_placed = true;
        Ok(field)
    }

    /// Board height.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Board width.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total mines.
    pub fn mine_count(&self) -> usize {
        self.mines
    }

    /// Number of flags currently placed.
    pub fn flag_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_flagged).count()
    }

    /// Seconds elapsed since the first reveal.
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    /// Whether the first reveal has happened.
    pub fn started(&self) -> bool {
        self.started
    }

    /// The cell at `(r, c)`.
    pub fn cell(&self, r: usize, c: usize) -> Option<&Cell> {
        if r < self.rows && c < self.cols {
            self.cells.get(self.index(r, c))
        } else {
            None
        }
    }

    /// Uncovers a cell, placing mines first if this is the opening move.
    ///
    /// Returns every cell newly revealed by this move, each exactly once.
    #[instrument(skip(self, rng))]
    pub fn reveal<R: Rng + ?Sized>(
        &mut self,
        r: usize,
        c: usize,
        rng: &mut R,
    ) -> Result<Vec<Coord>, MoveError> {
        if self.status.is_terminal() {
            return Err(MoveError::GameOver);
        }
        let cell = *self
            .cell(r, c)
            .ok_or_else(|| MoveError::OutOfBounds(format!("({r}, {c})")))?;
        if cell.is_flagged {
            return Err(MoveError::Flagged(r, c));
        }
        if cell.is_revealed {
            return Err(MoveError::AlreadyTaken(format!("Cell ({r}, {c})")));
        }

        if !self.mines_placed {
            self.place_mines((r, c), rng);
        }
        self.started = true;

        let idx = self.index(r, c);
        if self.cells[idx].is_mine {
            info!(row = r, col = c, "Stepped on a mine");
            let mut revealed = Vec::new();
            for (i, cell) in self.cells.iter_mut().enumerate() {
                if !cell.is_revealed {
                    cell.is_revealed = true;
                    revealed.push((i / self.cols, i % self.cols));
                }
            }
            self.status = Status::Lost;
            return Ok(revealed);
        }

        let revealed = self.flood_reveal((r, c));
        debug!(count = revealed.len(), "Revealed cells");

        if self.all_safe_revealed() {
            info!(elapsed = self.elapsed, "Minefield cleared");
            self.status = Status::Won;
        }
        Ok(revealed)
    }

    /// Toggles the flag on a covered cell.
    #[instrument(skip(self))]
    pub fn toggle_flag(&mut self, r: usize, c: usize) -> Result<bool, MoveError> {
        if self.status.is_terminal() {
            return Err(MoveError::GameOver);
        }
        if self.cell(r, c).is_none() {
            return Err(MoveError::OutOfBounds(format!("({r}, {c})")));
        }
        let idx = self.index(r, c);
        let cell = &mut self.cells[idx];
        if cell.is_revealed {
            return Err(MoveError::AlreadyTaken(format!("Cell ({r}, {c})")));
        }
        cell.is_flagged = !cell.is_flagged;
        Ok(cell.is_flagged)
    }

    /// Advances the clock by one second while a game is running.
    pub fn tick(&mut self) {
        if self.started && !self.status.is_terminal() {
            self.elapsed += 1;
        }
    }

    /// Clears the board for a new game with the same dimensions.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.cells = vec![Cell::default(); self.rows * self.cols];
        self.mines_placed = false;
        self.started = false;
        self.status = Status::InProgress;
        self.elapsed = 0;
    }

    /// Formats the field: `#` covered, `F` flag, `*` mine, digits, `.` empty.
    pub fn display(&self) -> String {
        let mut out = String::new();
        for r in 0..self.rows {
            for c in 0..self.cols {
                let cell = self.cells[self.index(r, c)];
                let ch = if cell.is_flagged && !cell.is_revealed {
                    'F'
                } else if !cell.is_revealed {
                    '#'
                } else if cell.is_mine {
                    '*'
                } else if cell.adjacent_mines == 0 {
                    '.'
                } else {
                    char::from(b'0' + cell.adjacent_mines)
                };
                out.push(ch);
            }
            if r + 1 < self.rows {
                out.push('\n');
            }
        }
        out
    }

    fn index(&self, r: usize, c: usize) -> usize {
        r * self.cols + c
    }

    fn neighbours(&self, (r, c): Coord) -> impl Iterator<Item = Coord> + use<> {
        let rows = self.rows;
        let cols = self.cols;
        let r_lo = r.saturating_sub(1);
        let c_lo = c.saturating_sub(1);
        let r_hi = (r + 1).min(rows - 1);
        let c_hi = (c + 1).min(cols - 1);
        (r_lo..=r_hi)
            .flat_map(move |nr| (c_lo..=c_hi).map(move |nc| (nr, nc)))
            .filter(move |&n| n != (r, c))
    }

    /// Places mines uniformly at random, never on `safe`.
    fn place_mines<R: Rng + ?Sized>(&mut self, safe: Coord, rng: &mut R) {
        let safe_idx = self.index(safe.0, safe.1);
        let candidates = self.cells.len() - 1;
        for pick in rand::seq::index::sample(rng, candidates, self.mines).into_iter() {
            let idx = if pick >= safe_idx { pick + 1 } else { pick };
            self.cells[idx].is_mine = true;
        }
        self.compute_adjacency();
        self.mines_placed = true;
        debug!(mines = self.mines, ?safe, "Mines placed");
    }

    fn compute_adjacency(&mut self) {
        for r in 0..self.rows {
            for c in 0..self.cols {
                let idx = self.index(r, c);
                if self.cells[idx].is_mine {
                    continue;
                }
                let count = self
                    .neighbours((r, c))
                    .filter(|&(nr, nc)| self.cells[self.index(nr, nc)].is_mine)
                    .count();
                self.cells[idx].adjacent_mines = count as u8;
            }
        }
    }

    /// Reveals `start` and, through zero cells, its whole connected region.
    ///
    /// Cells are marked revealed when pushed, so none is visited twice.
    fn flood_reveal(&mut self, start: Coord) -> Vec<Coord> {
        let mut revealed = Vec::new();
        let mut work = vec![start];
        let idx = self.index(start.0, start.1);
        self.cells[idx].is_revealed = true;

        while let Some(coord) = work.pop() {
            revealed.push(coord);
            let idx = self.index(coord.0, coord.1);
            if self.cells[idx].adjacent_mines != 0 {
                continue;
            }
            for (nr, nc) in self.neighbours(coord) {
                let nidx = self.index(nr, nc);
                let neighbour = &mut self.cells[nidx];
                if !neighbour.is_revealed && !neighbour.is_flagged && !neighbour.is_mine {
                    neighbour.is_revealed = true;
                    work.push((nr, nc));
                }
            }
        }
        revealed
    }

    fn all_safe_revealed(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_mine || cell.is_revealed)
    }
}

impl Default for Minefield {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            mines: DEFAULT_MINES,
            cells: vec![Cell::default(); DEFAULT_ROWS * DEFAULT_COLS],
            mines_placed: false,
            started: false,
            status: Status::InProgress,
            elapsed: 0,
        }
    }
}

impl Engine for Minefield {
    fn status(&self) -> Status {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn rejects_overfull_field() {
        assert!(Minefield::new(3, 3, 9).is_err());
        assert!(Minefield::new(0, 3, 1).is_err());
        assert!(Minefield::new(3, 3, 8).is_ok());
    }

    #[test]
    fn first_click_never_hits_a_mine() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut field = Minefield::new(3, 3, 8).unwrap();
            field.reveal(1, 1, &mut rng).unwrap();
            assert!(!field.cell(1, 1).unwrap().is_mine);
            assert_eq!(field.status(), Status::Won);
        }
    }

    #[test]
    fn mine_count_matches_request() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut field = Minefield::default();
        field.reveal(0, 0, &mut rng).unwrap();
        let mines = (0..10)
            .flat_map(|r| (0..10).map(move |c| (r, c)))
            .filter(|&(r, c)| field.cell(r, c).unwrap().is_mine)
            .count();
        assert_eq!(mines, DEFAULT_MINES);
    }

    #[test]
    fn flood_fill_reveals_region_and_border_once() {
        // Single mine in the bottom-right corner of a 4x4 field.
        let mut rng = StdRng::seed_from_u64(0);
        let mut field = Minefield::with_mines(4, 4, &[(3, 3)]).unwrap();
        let revealed = field.reveal(0, 0, &mut rng).unwrap();

        let unique: HashSet<_> = revealed.iter().copied().collect();
        assert_eq!(unique.len(), revealed.len(), "a cell was revealed twice");
        assert_eq!(revealed.len(), 15);
        assert_eq!(field.status(), Status::Won);
    }

    #[test]
    fn flood_fill_stops_at_numbers() {
        // Wall of mines down column 2 of a 3x5 field.
        let mut rng = StdRng::seed_from_u64(0);
        let mut field = Minefield::with_mines(3, 5, &[(0, 2), (1, 2), (2, 2)]).unwrap();
        let revealed: HashSet<_> = field.reveal(0, 0, &mut rng).unwrap().into_iter().collect();
        let expected: HashSet<_> = [(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]
            .into_iter()
            .collect();
        assert_eq!(revealed, expected);
        assert!(!field.cell(0, 3).unwrap().is_revealed);
        assert_eq!(field.status(), Status::InProgress);
    }

    #[test]
    fn flags_block_reveal_and_flood() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut field = Minefield::with_mines(4, 4, &[(3, 3)]).unwrap();
        assert_eq!(field.toggle_flag(0, 3), Ok(true));
        assert_eq!(field.reveal(0, 3, &mut rng), Err(MoveError::Flagged(0, 3)));
        field.reveal(0, 0, &mut rng).unwrap();
        assert!(!field.cell(0, 3).unwrap().is_revealed);
        assert_eq!(field.status(), Status::InProgress);
    }

    #[test]
    fn mine_reveals_everything_and_locks() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut field = Minefield::with_mines(2, 2, &[(0, 0)]).unwrap();
        field.reveal(0, 0, &mut rng).unwrap();
        assert_eq!(field.status(), Status::Lost);
        assert!((0..2).all(|r| (0..2).all(|c| field.cell(r, c).unwrap().is_revealed)));
        assert_eq!(field.reveal(1, 1, &mut rng), Err(MoveError::GameOver));
        assert_eq!(field.toggle_flag(1, 1), Err(MoveError::GameOver));
    }

    #[test]
    fn clock_runs_only_while_playing() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut field = Minefield::with_mines(3, 5, &[(0, 2), (1, 2), (2, 2)]).unwrap();
        field.tick();
        assert_eq!(field.elapsed(), 0);
        field.reveal(0, 0, &mut rng).unwrap();
        field.tick();
        field.tick();
        assert_eq!(field.elapsed(), 2);
        field.reveal(0, 2, &mut rng).unwrap();
        field.tick();
        assert_eq!(field.elapsed(), 2);
    }
}
