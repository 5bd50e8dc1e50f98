//! Shared terminal-state vocabulary.

use serde::{Deserialize, Serialize};

/// Where a game stands from the human player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Moves are still accepted.
    InProgress,
    /// The player won.
    Won,
    /// The player lost.
    Lost,
    /// Nobody won.
    Draw,
}

impl Status {
    /// True for every state after which moves are refused.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::InProgress)
    }
}

/// Common surface of every minigame engine.
///
/// `status` is the single win/loss/draw predicate of the engine and is
/// evaluated after every state-mutating move.
pub trait Engine {
    /// Current status.
    fn status(&self) -> Status;

    /// True once the game reached a terminal state.
    fn is_over(&self) -> bool {
        self.status().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_in_progress_is_open() {
        assert!(!Status::InProgress.is_terminal());
        assert!(Status::Won.is_terminal());
        assert!(Status::Lost.is_terminal());
        assert!(Status::Draw.is_terminal());
    }
}
