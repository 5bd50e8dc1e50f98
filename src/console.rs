//! Line-driven play loops for the terminal front end.
//!
//! Input arrives as lines on a channel, so each loop can race the next line
//! against the game clock and any model request still in flight. Output is
//! reported through a callback; the loops never print.

use crate::arcade::{ActiveGame, Arcade};
use crate::content::ContentAdapter;
use crate::play::apply_input;
use crate::timers::{GameClock, Pacing, opponent_turn, settle_memory};
use companion_games::{Debate, Engine, MoveError, Position, RebuttalTicket, Status, Turn};
use futures::future::BoxFuture;
use rand::Rng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Player input, one line per message.
pub type Lines = mpsc::UnboundedReceiver<String>;

/// Inputs that leave a play loop without finishing the game.
pub const QUIT_COMMANDS: [&str; 2] = ["/quit", "/exit"];

/// Forwards stdin lines into a channel until stdin closes.
pub fn stdin_lines() -> Lines {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to read stdin");
                    break;
                }
            }
        }
        debug!("Input closed");
    });
    rx
}

fn is_quit(line: &str) -> bool {
    QUIT_COMMANDS.contains(&line.trim())
}

/// Why a play loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The game reached this terminal status.
    Finished(Status),
    /// The player asked to leave.
    Quit,
    /// The input channel closed.
    InputClosed,
}

// ─────────────────────────────────────────────────────────────
//  Turn-based games
// ─────────────────────────────────────────────────────────────

/// Something the player should see during a game.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayUpdate {
    /// The board after a change.
    Board(String),
    /// An input was refused.
    Rejected(MoveError),
    /// The opponent is about to move.
    Thinking,
    /// The opponent took this square.
    OpponentMoved(Position),
}

/// Plays the arcade's open game from `lines` until it ends.
///
/// The game clock keeps ticking between inputs, so minesweeper's elapsed
/// time advances even while the player is thinking.
#[instrument(skip_all)]
pub async fn play_game<R, F>(
    arcade: &mut Arcade,
    lines: &mut Lines,
    clock: &mut GameClock,
    pacing: Pacing,
    rng: &mut R,
    mut report: F,
) -> LoopExit
where
    R: Rng + ?Sized,
    F: FnMut(PlayUpdate),
{
    loop {
        let Some(game) = arcade.game() else {
            warn!("No game to play");
            return LoopExit::Quit;
        };
        let status = game.status();
        if status.is_terminal() {
            info!(?status, kind = %game.kind(), "Game finished");
            return LoopExit::Finished(status);
        }

        tokio::select! {
            _ = clock.tick() => arcade.tick(),
            line = lines.recv() => {
                let Some(line) = line else {
                    return LoopExit::InputClosed;
                };
                if is_quit(&line) {
                    return LoopExit::Quit;
                }
                let Some(game) = arcade.game_mut() else {
                    return LoopExit::Quit;
                };
                match apply_input(game, &line, rng) {
                    Ok(()) => {
                        report(PlayUpdate::Board(game.render()));
                        if follow_up(game, pacing, rng, &mut report).await {
                            report(PlayUpdate::Board(game.render()));
                        }
                    }
                    Err(e) => report(PlayUpdate::Rejected(e)),
                }
            }
        }
    }
}

/// Runs the delayed reaction a move can trigger; true if the game changed.
async fn follow_up<R, F>(game: &mut ActiveGame, pacing: Pacing, rng: &mut R, report: &mut F) -> bool
where
    R: Rng + ?Sized,
    F: FnMut(PlayUpdate),
{
    match game {
        ActiveGame::TicTacToe(g) if g.awaiting_opponent() => {
            report(PlayUpdate::Thinking);
            match opponent_turn(g, rng, pacing.opponent).await {
                Ok(Some(pos)) => {
                    report(PlayUpdate::OpponentMoved(pos));
                    true
                }
                Ok(None) => false,
                Err(e) => {
                    warn!(error = %e, "Opponent could not move");
                    false
                }
            }
        }
        ActiveGame::Memory(g) => settle_memory(g, pacing.reveal).await,
        _ => false,
    }
}

// ─────────────────────────────────────────────────────────────
//  Debate
// ─────────────────────────────────────────────────────────────

/// Something the player should see during a debate.
#[derive(Debug, Clone, PartialEq)]
pub enum DebateUpdate {
    /// The opponent answered.
    Rebuttal {
        /// The rebuttal text.
        text: String,
        /// Seconds left on the clock.
        remaining: u32,
    },
    /// An argument was refused.
    Rejected(MoveError),
    /// The clock ran out.
    TimeUp,
}

type PendingRebuttal = Option<(RebuttalTicket, BoxFuture<'static, String>)>;

async fn next_rebuttal(pending: &mut PendingRebuttal) -> Option<(RebuttalTicket, String)> {
    let (ticket, request) = pending.as_mut()?;
    let text = request.await;
    Some((*ticket, text))
}

/// Debates from `lines` until the clock runs out.
///
/// The clock keeps running while the opponent's rebuttal is requested. A
/// rebuttal still in flight when time is up is dropped with the loop.
#[instrument(skip_all, fields(topic = %debate.topic()))]
pub async fn run_debate<F>(
    debate: &mut Debate,
    adapter: &ContentAdapter,
    lines: &mut Lines,
    clock: &mut GameClock,
    mut report: F,
) -> LoopExit
where
    F: FnMut(DebateUpdate),
{
    let mut pending: PendingRebuttal = None;
    loop {
        if debate.turn() == Turn::Ended {
            report(DebateUpdate::TimeUp);
            return LoopExit::Finished(debate.status());
        }

        tokio::select! {
            _ = clock.tick() => debate.tick(),
            Some((ticket, text)) = next_rebuttal(&mut pending), if pending.is_some() => {
                pending = None;
                match debate.receive_rebuttal(ticket, text.clone()) {
                    Ok(()) => report(DebateUpdate::Rebuttal {
                        text,
                        remaining: debate.remaining(),
                    }),
                    Err(e) => debug!(error = %e, "Rebuttal dropped"),
                }
            }
            line = lines.recv() => {
                let Some(line) = line else {
                    return LoopExit::InputClosed;
                };
                if is_quit(&line) {
                    return LoopExit::Quit;
                }
                match debate.submit_argument(&line) {
                    Ok(ticket) => pending = Some((ticket, adapter.rebuttal(debate))),
                    Err(e) => report(DebateUpdate::Rejected(e)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcade::ArcadeSettings;
    use companion_games::{GameKind, Minefield};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn quit_commands_ignore_whitespace() {
        assert!(is_quit(" /quit "));
        assert!(is_quit("/exit"));
        assert!(!is_quit("quit"));
    }

    #[tokio::test(start_paused = true)]
    async fn closed_input_leaves_the_game_open() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut arcade = Arcade::new(ArcadeSettings::default());
        arcade.open_game(GameKind::Sudoku, &mut rng);
        let (tx, mut lines) = mpsc::unbounded_channel();
        drop(tx);

        let exit = play_game(
            &mut arcade,
            &mut lines,
            &mut GameClock::default(),
            Pacing::default(),
            &mut rng,
            |_| {},
        )
        .await;
        assert_eq!(exit, LoopExit::InputClosed);
        assert_eq!(arcade.game().unwrap().status(), Status::InProgress);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_input_is_reported() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut arcade = Arcade::new(ArcadeSettings::default());
        arcade.open_game(GameKind::Minesweeper, &mut rng);
        *arcade.game_mut().unwrap() =
            ActiveGame::Minesweeper(Minefield::with_mines(3, 3, &[(0, 1)]).unwrap());
        let (tx, mut lines) = mpsc::unbounded_channel();
        tx.send("9 9".to_string()).unwrap();
        tx.send("/quit".to_string()).unwrap();

        let mut updates = Vec::new();
        let exit = play_game(
            &mut arcade,
            &mut lines,
            &mut GameClock::default(),
            Pacing::default(),
            &mut rng,
            |update| updates.push(update),
        )
        .await;
        assert_eq!(exit, LoopExit::Quit);
        assert!(matches!(updates[..], [PlayUpdate::Rejected(_)]));
    }
}
