//! Fixed delays that pace the games.

use companion_games::{MemoryMatch, MoveError, Position, TicTacToe};
use derive_new::new;
use rand::Rng;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, instrument};

/// Thinking delay before the tic-tac-toe opponent moves.
pub const OPPONENT_DELAY: Duration = Duration::from_millis(500);

/// How long a mismatched memory pair stays face up.
pub const REVEAL_DELAY: Duration = Duration::from_millis(1000);

/// Period of the game clock.
pub const TICK: Duration = Duration::from_secs(1);

/// Delays applied after a player's move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct Pacing {
    /// Before the tic-tac-toe opponent replies.
    pub opponent: Duration,
    /// Before a mismatched memory pair is turned back.
    pub reveal: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new(OPPONENT_DELAY, REVEAL_DELAY)
    }
}

/// Waits out the thinking delay, then lets the opponent move.
///
/// Returns `Ok(None)` when it was not the opponent's turn.
#[instrument(skip(game, rng))]
pub async fn opponent_turn<R: Rng + ?Sized>(
    game: &mut TicTacToe,
    rng: &mut R,
    delay: Duration,
) -> Result<Option<Position>, MoveError> {
    if !game.awaiting_opponent() {
        return Ok(None);
    }
    tokio::time::sleep(delay).await;
    let pos = game.play_opponent(rng)?;
    debug!(?pos, "Opponent moved");
    Ok(Some(pos))
}

/// Waits out the reveal delay, then turns a face-up pair back over.
#[instrument(skip(game))]
pub async fn settle_memory(game: &mut MemoryMatch, delay: Duration) -> bool {
    if !game.needs_settle() {
        return false;
    }
    tokio::time::sleep(delay).await;
    game.settle();
    true
}

/// One-second clock for minesweeper and debate.
#[derive(Debug)]
pub struct GameClock {
    interval: Interval,
}

impl GameClock {
    /// Starts a clock whose first tick is one period from now.
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    /// Waits for the next tick.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(TICK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use companion_games::{Engine, PairOutcome};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[tokio::test(start_paused = true)]
    async fn opponent_waits_before_moving() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut game = TicTacToe::new();
        game.apply_move(Position::Center).unwrap();

        let start = tokio::time::Instant::now();
        let pos = opponent_turn(&mut game, &mut rng, OPPONENT_DELAY)
            .await
            .unwrap()
            .unwrap();
        assert!(start.elapsed() >= OPPONENT_DELAY);
        assert_ne!(pos, Position::Center);
        assert!(!game.awaiting_opponent());
    }

    #[tokio::test(start_paused = true)]
    async fn no_opponent_move_on_players_turn() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut game = TicTacToe::new();
        let start = tokio::time::Instant::now();
        assert_eq!(
            opponent_turn(&mut game, &mut rng, OPPONENT_DELAY).await,
            Ok(None)
        );
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn mismatch_turns_back_after_delay() {
        let mut game = MemoryMatch::from_deck(vec!["a", "b"], vec!["a", "b", "a", "b"]);
        assert_eq!(game.flip(0).unwrap(), PairOutcome::Pending);
        assert_eq!(game.flip(1).unwrap(), PairOutcome::Mismatched);

        let start = tokio::time::Instant::now();
        assert!(settle_memory(&mut game, REVEAL_DELAY).await);
        assert!(start.elapsed() >= REVEAL_DELAY);
        assert!(game.face_up().is_empty());
        assert!(!game.is_over());
    }

    #[tokio::test(start_paused = true)]
    async fn clock_ticks_once_per_period() {
        let mut clock = GameClock::default();
        let start = tokio::time::Instant::now();
        clock.tick().await;
        clock.tick().await;
        assert_eq!(start.elapsed(), TICK * 2);
    }
}
