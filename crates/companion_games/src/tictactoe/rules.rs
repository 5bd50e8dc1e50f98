//! Game logic and rules for tic-tac-toe.

use super::position::Position;
use super::types::{Board, GameStatus, Player, Square};
use crate::error::MoveError;
use crate::random::{LegalMoves, random_legal_move};
use crate::status::{Engine, Status};
use rand::Rng;
use tracing::{debug, info, instrument};

/// The eight winning lines.
const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [Position::MiddleLeft, Position::Center, Position::MiddleRight],
    [Position::BottomLeft, Position::BottomCenter, Position::BottomRight],
    // Columns
    [Position::TopLeft, Position::MiddleLeft, Position::BottomLeft],
    [Position::TopCenter, Position::Center, Position::BottomCenter],
    [Position::TopRight, Position::MiddleRight, Position::BottomRight],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// Checks if there is a winner on the board.
pub fn check_winner(board: &Board) -> Option<Player> {
    for [a, b, c] in LINES {
        let sq = board.get(a);
        if sq != Square::Empty && sq == board.get(b) && sq == board.get(c) {
            return match sq {
                Square::Occupied(player) => Some(player),
                Square::Empty => None,
            };
        }
    }
    None
}

/// Tic-tac-toe against a random opponent.
///
/// The human always plays X and moves first; O is driven by
/// [`TicTacToe::play_opponent`].
#[derive(Debug, Clone)]
pub struct TicTacToe {
    board: Board,
    to_move: Player,
    status: GameStatus,
    history: Vec<Position>,
}

impl TicTacToe {
    /// Creates a new game.
    #[instrument]
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            to_move: Player::X,
            status: GameStatus::InProgress,
            history: Vec::new(),
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the player to move.
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    /// Returns the terminal result, if any.
    pub fn game_status(&self) -> GameStatus {
        self.status
    }

    /// Returns the move history.
    pub fn history(&self) -> &[Position] {
        &self.history
    }

    /// True when the opponent should move next.
    pub fn awaiting_opponent(&self) -> bool {
        self.status == GameStatus::InProgress && self.to_move == Player::O
    }

    /// Places the human's mark.
    #[instrument(skip(self))]
    pub fn apply_move(&mut self, pos: Position) -> Result<(), MoveError> {
        self.place(Player::X, pos)
    }

    /// Lets the opponent pick uniformly among the empty squares.
    #[instrument(skip(self, rng))]
    pub fn play_opponent<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Position, MoveError> {
        if self.status != GameStatus::InProgress {
            return Err(MoveError::GameOver);
        }
        if self.to_move != Player::O {
            return Err(MoveError::NotYourTurn);
        }
        // A non-terminal board always has an empty square.
        let pos = random_legal_move(self, rng).ok_or(MoveError::GameOver)?;
        self.place(Player::O, pos)?;
        Ok(pos)
    }

    /// Resets to a fresh board.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn place(&mut self, player: Player, pos: Position) -> Result<(), MoveError> {
        if self.status != GameStatus::InProgress {
            debug!(?pos, "Move after game over");
            return Err(MoveError::GameOver);
        }
        if self.to_move != player {
            return Err(MoveError::NotYourTurn);
        }
        if !self.board.is_empty(pos) {
            return Err(MoveError::AlreadyTaken(pos.label().to_string()));
        }

        self.board.set(pos, Square::Occupied(player));
        self.history.push(pos);
        self.update_status();
        self.to_move = player.opponent();

        debug!(?player, ?pos, status = ?self.status, "Move applied");
        Ok(())
    }

    /// A completed line wins even when it also fills the board.
    fn update_status(&mut self) {
        if let Some(winner) = check_winner(&self.board) {
            info!(?winner, "Tic-tac-toe won");
            self.status = GameStatus::Won(winner);
        } else if self.board.is_full() {
            info!("Tic-tac-toe draw");
            self.status = GameStatus::Draw;
        }
    }
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl LegalMoves for TicTacToe {
    type Move = Position;

    fn legal_moves(&self) -> Vec<Position> {
        if self.status != GameStatus::InProgress {
            return Vec::new();
        }
        Position::valid_moves(&self.board)
    }
}

impl Engine for TicTacToe {
    fn status(&self) -> Status {
        match self.status {
            GameStatus::InProgress => Status::InProgress,
            GameStatus::Won(Player::X) => Status::Won,
            GameStatus::Won(Player::O) => Status::Lost,
            GameStatus::Draw => Status::Draw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn board_with(marks: &[(Position, Player)]) -> Board {
        let mut board = Board::new();
        for (pos, player) in marks {
            board.set(*pos, Square::Occupied(*player));
        }
        board
    }

    #[test]
    fn no_winner_empty_board() {
        assert_eq!(check_winner(&Board::new()), None);
    }

    #[test]
    fn winner_top_row() {
        let board = board_with(&[
            (Position::TopLeft, Player::X),
            (Position::TopCenter, Player::X),
            (Position::TopRight, Player::X),
        ]);
        assert_eq!(check_winner(&board), Some(Player::X));
    }

    #[test]
    fn winner_diagonal() {
        let board = board_with(&[
            (Position::TopLeft, Player::O),
            (Position::Center, Player::O),
            (Position::BottomRight, Player::O),
        ]);
        assert_eq!(check_winner(&board), Some(Player::O));
    }

    #[test]
    fn occupied_square_rejected() {
        let mut game = TicTacToe::new();
        game.apply_move(Position::Center).unwrap();
        game.to_move = Player::X;
        assert!(matches!(
            game.apply_move(Position::Center),
            Err(MoveError::AlreadyTaken(_))
        ));
    }

    #[test]
    fn human_cannot_move_on_opponent_turn() {
        let mut game = TicTacToe::new();
        game.apply_move(Position::Center).unwrap();
        assert!(game.awaiting_opponent());
        assert_eq!(game.apply_move(Position::TopLeft), Err(MoveError::NotYourTurn));
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn opponent_plays_an_empty_square() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut game = TicTacToe::new();
        game.apply_move(Position::Center).unwrap();
        let pos = game.play_opponent(&mut rng).unwrap();
        assert_ne!(pos, Position::Center);
        assert_eq!(game.board().get(pos), Square::Occupied(Player::O));
        assert_eq!(game.to_move(), Player::X);
    }

    #[test]
    fn line_on_full_board_is_a_win_not_a_draw() {
        // X O X / O X O / O X . : the ninth mark completes the diagonal.
        let mut game = TicTacToe::new();
        game.board = board_with(&[
            (Position::TopLeft, Player::X),
            (Position::TopCenter, Player::O),
            (Position::TopRight, Player::X),
            (Position::MiddleLeft, Player::O),
            (Position::Center, Player::X),
            (Position::MiddleRight, Player::O),
            (Position::BottomLeft, Player::O),
            (Position::BottomCenter, Player::X),
        ]);
        game.apply_move(Position::BottomRight).unwrap();
        assert!(game.board().is_full());
        assert_eq!(game.game_status(), GameStatus::Won(Player::X));
        assert_eq!(game.status(), Status::Won);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut game = TicTacToe::new();
        game.apply_move(Position::Center).unwrap();
        game.reset();
        assert_eq!(game.history().len(), 0);
        assert_eq!(game.to_move(), Player::X);
        assert_eq!(game.game_status(), GameStatus::InProgress);
    }
}
