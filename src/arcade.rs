//! The modal host: which game or music panel is open.
//!
//! The arcade owns the open game. Opening another game or closing the modal
//! drops it. Games that need generated content start in a loading state
//! and hand out a [`LoadTicket`]; content delivered against a ticket that is
//! no longer current is rejected, so a slow response never lands in a game
//! the user has already left.

use crate::content::GameContent;
use crate::music::MusicPanel;
use crate::orchestrator::ChatEvent;
use companion_games::{
    Constellation, Debate, Engine, Feud, GameKind, MemoryMatch, Minefield, MoveError, RiddleGame,
    Status, Sudoku, TicTacToe, WordGuess,
};
use derive_getters::Getters;
use rand::Rng;
use tracing::{debug, info, instrument, warn};

/// Claim on a pending content load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    kind: GameKind,
    epoch: u64,
}

impl LoadTicket {
    /// Game waiting for content.
    pub fn kind(&self) -> GameKind {
        self.kind
    }
}

/// A running game.
#[derive(Debug, Clone)]
pub enum ActiveGame {
    /// Memory match.
    Memory(MemoryMatch),
    /// Tic-tac-toe.
    TicTacToe(TicTacToe),
    /// Sudoku.
    Sudoku(Sudoku),
    /// Minesweeper.
    Minesweeper(Minefield),
    /// Riddle.
    Riddle(RiddleGame),
    /// Word guess.
    WordGuess(WordGuess),
    /// Survey trivia.
    Feud(Feud),
    /// Debate.
    Debate(Debate),
    /// Connect the stars.
    ConnectStars(Constellation),
}

impl ActiveGame {
    /// Which game this is.
    pub fn kind(&self) -> GameKind {
        match self {
            ActiveGame::Memory(_) => GameKind::Memory,
            ActiveGame::TicTacToe(_) => GameKind::TicTacToe,
            ActiveGame::Sudoku(_) => GameKind::Sudoku,
            ActiveGame::Minesweeper(_) => GameKind::Minesweeper,
            ActiveGame::Riddle(_) => GameKind::Riddle,
            ActiveGame::WordGuess(_) => GameKind::WordGuess,
            ActiveGame::Feud(_) => GameKind::Feud,
            ActiveGame::Debate(_) => GameKind::Debate,
            ActiveGame::ConnectStars(_) => GameKind::ConnectStars,
        }
    }

    /// Current status.
    pub fn status(&self) -> Status {
        match self {
            ActiveGame::Memory(g) => g.status(),
            ActiveGame::TicTacToe(g) => g.status(),
            ActiveGame::Sudoku(g) => g.status(),
            ActiveGame::Minesweeper(g) => g.status(),
            ActiveGame::Riddle(g) => g.status(),
            ActiveGame::WordGuess(g) => g.status(),
            ActiveGame::Feud(g) => g.status(),
            ActiveGame::Debate(g) => g.status(),
            ActiveGame::ConnectStars(g) => g.status(),
        }
    }

    /// Forwards a one-second tick to clocked games.
    pub fn tick(&mut self) {
        match self {
            ActiveGame::Minesweeper(g) => g.tick(),
            ActiveGame::Debate(g) => g.tick(),
            _ => {}
        }
    }

    /// Plain-text view of the game.
    pub fn render(&self) -> String {
        match self {
            ActiveGame::Memory(g) => g
                .deck()
                .iter()
                .enumerate()
                .map(|(i, symbol)| {
                    if g.is_revealed(i) {
                        symbol.to_string()
                    } else {
                        "?".to_string()
                    }
                })
                .collect::<Vec<_>>()
                .chunks(4)
                .map(|row| row.join(" "))
                .collect::<Vec<_>>()
                .join("\n"),
            ActiveGame::TicTacToe(g) => g.board().display(),
            ActiveGame::Sudoku(g) => g.display(),
            ActiveGame::Minesweeper(g) => g.display(),
            ActiveGame::Riddle(g) => g.riddle().to_string(),
            ActiveGame::WordGuess(g) => format!(
                "{}\nmissing: {}",
                g.masked_word(),
                g.figure().join(", ")
            ),
            ActiveGame::Feud(g) => {
                let mut out = format!("{}\n", g.question());
                for (i, slot) in g.answers_for_display().iter().enumerate() {
                    if slot.revealed {
                        out.push_str(&format!("{}. {} ({})\n", i + 1, slot.answer, slot.points));
                    } else {
                        out.push_str(&format!("{}. ____\n", i + 1));
                    }
                }
                out.push_str(&format!("strikes: {}  score: {}", g.strikes(), g.score()));
                out
            }
            ActiveGame::Debate(g) => format!(
                "{}\nYou argue: {}\nOpponent: {}\n{}s left",
                g.topic(),
                g.side(),
                g.opening(),
                g.remaining()
            ),
            ActiveGame::ConnectStars(g) => format!(
                "{}: {}/{} stars, next is {}",
                g.name(),
                g.connected().len(),
                g.stars().len(),
                g.next_id()
            ),
        }
    }
}

/// What the game modal currently shows.
#[derive(Debug, Clone)]
pub enum GameSlot {
    /// Waiting for generated content.
    Loading(LoadTicket),
    /// A game is being played.
    Playing(ActiveGame),
}

/// Board settings for locally built games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct ArcadeSettings {
    mine_rows: usize,
    mine_cols: usize,
    mine_count: usize,
}

impl ArcadeSettings {
    /// Creates settings for the minesweeper board.
    pub fn new(mine_rows: usize, mine_cols: usize, mine_count: usize) -> Self {
        Self {
            mine_rows,
            mine_cols,
            mine_count,
        }
    }
}

impl Default for ArcadeSettings {
    fn default() -> Self {
        Self::new(
            companion_games::DEFAULT_ROWS,
            companion_games::DEFAULT_COLS,
            companion_games::DEFAULT_MINES,
        )
    }
}

/// Modal host for games and music.
#[derive(Debug, Default)]
pub struct Arcade {
    slot: Option<GameSlot>,
    music: Option<MusicPanel>,
    epoch: u64,
    settings: ArcadeSettings,
}

impl Arcade {
    /// Creates an empty arcade.
    pub fn new(settings: ArcadeSettings) -> Self {
        Self {
            slot: None,
            music: None,
            epoch: 0,
            settings,
        }
    }

    /// Reacts to orchestrator events; returns a ticket when content must
    /// be fetched.
    #[instrument(skip(self, rng))]
    pub fn apply<R: Rng + ?Sized>(&mut self, event: &ChatEvent, rng: &mut R) -> Option<LoadTicket> {
        match event {
            ChatEvent::OpenGame(kind) => self.open_game(*kind, rng),
            ChatEvent::OpenMusic(query) => {
                self.open_music(query.clone());
                None
            }
            _ => None,
        }
    }

    /// Opens a game, replacing whatever was open.
    #[instrument(skip(self, rng))]
    pub fn open_game<R: Rng + ?Sized>(&mut self, kind: GameKind, rng: &mut R) -> Option<LoadTicket> {
        self.epoch += 1;
        if kind.needs_content() {
            let ticket = LoadTicket {
                kind,
                epoch: self.epoch,
            };
            info!(%kind, epoch = self.epoch, "Game waiting for content");
            self.slot = Some(GameSlot::Loading(ticket));
            return Some(ticket);
        }

        let game = match kind {
            GameKind::Memory => ActiveGame::Memory(MemoryMatch::new(rng)),
            GameKind::TicTacToe => ActiveGame::TicTacToe(TicTacToe::new()),
            GameKind::Sudoku => ActiveGame::Sudoku(Sudoku::example()),
            GameKind::Minesweeper => ActiveGame::Minesweeper(self.minefield()),
            GameKind::WordGuess => ActiveGame::WordGuess(WordGuess::new(rng)),
            GameKind::ConnectStars => ActiveGame::ConnectStars(Constellation::great_bear()),
            GameKind::Riddle | GameKind::Feud | GameKind::Debate => return None,
        };
        info!(%kind, "Game opened");
        self.slot = Some(GameSlot::Playing(game));
        None
    }

    fn minefield(&self) -> Minefield {
        let s = self.settings;
        Minefield::new(s.mine_rows, s.mine_cols, s.mine_count).unwrap_or_else(|e| {
            warn!(error = %e, "Invalid minesweeper settings, using defaults");
            Minefield::default()
        })
    }

    /// Installs content for a pending load.
    #[instrument(skip(self, content, rng))]
    pub fn deliver<R: Rng + ?Sized>(
        &mut self,
        ticket: LoadTicket,
        content: GameContent,
        rng: &mut R,
    ) -> Result<(), MoveError> {
        let pending = matches!(self.slot, Some(GameSlot::Loading(current)) if current == ticket);
        if !pending {
            warn!(ticket = ticket.epoch, current = self.epoch, "Dropping stale content");
            return Err(MoveError::StaleTicket {
                got: ticket.epoch,
                current: self.epoch,
            });
        }
        if content.kind() != ticket.kind {
            return Err(MoveError::InvalidInput(format!(
                "{} content delivered to {}",
                content.kind(),
                ticket.kind
            )));
        }

        let game = match content {
            GameContent::Riddle(riddle) => ActiveGame::Riddle(RiddleGame::new(riddle)),
            GameContent::Feud(set) => ActiveGame::Feud(Feud::new(set)),
            GameContent::Debate(opening) => ActiveGame::Debate(Debate::new(opening, rng)),
        };
        debug!(kind = %ticket.kind, "Content delivered");
        self.slot = Some(GameSlot::Playing(game));
        Ok(())
    }

    /// Closes the game modal.
    #[instrument(skip(self))]
    pub fn close_game(&mut self) {
        self.epoch += 1;
        if self.slot.take().is_some() {
            debug!("Game closed");
        }
    }

    /// Opens the music panel.
    #[instrument(skip(self))]
    pub fn open_music(&mut self, query: String) {
        info!(%query, "Music panel opened");
        self.music = Some(MusicPanel::new(query));
    }

    /// Closes the music panel.
    pub fn close_music(&mut self) {
        self.music = None;
    }

    /// One-second tick.
    pub fn tick(&mut self) {
        if let Some(game) = self.game_mut() {
            game.tick();
        }
    }

    /// Game modal contents.
    pub fn slot(&self) -> Option<&GameSlot> {
        self.slot.as_ref()
    }

    /// Running game, if one is ready.
    pub fn game(&self) -> Option<&ActiveGame> {
        match &self.slot {
            Some(GameSlot::Playing(game)) => Some(game),
            _ => None,
        }
    }

    /// Running game, mutably.
    pub fn game_mut(&mut self) -> Option<&mut ActiveGame> {
        match &mut self.slot {
            Some(GameSlot::Playing(game)) => Some(game),
            _ => None,
        }
    }

    /// Whether a game is waiting for content.
    pub fn is_loading(&self) -> bool {
        matches!(self.slot, Some(GameSlot::Loading(_)))
    }

    /// Open music panel.
    pub fn music(&self) -> Option<&MusicPanel> {
        self.music.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{fallback_riddle, fallback_trivia};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn local_games_open_immediately() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut arcade = Arcade::default();
        assert!(arcade.apply(&ChatEvent::OpenGame(GameKind::Memory), &mut rng).is_none());
        assert_eq!(arcade.game().unwrap().kind(), GameKind::Memory);
        assert_eq!(arcade.game().unwrap().status(), Status::InProgress);
    }

    #[test]
    fn stale_content_is_dropped() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut arcade = Arcade::default();
        let old = arcade.open_game(GameKind::Riddle, &mut rng).unwrap();
        let new = arcade.open_game(GameKind::Feud, &mut rng).unwrap();
        assert!(matches!(
            arcade.deliver(old, GameContent::Riddle(fallback_riddle()), &mut rng),
            Err(MoveError::StaleTicket { .. })
        ));
        assert!(arcade.is_loading());
        arcade
            .deliver(new, GameContent::Feud(fallback_trivia()), &mut rng)
            .unwrap();
        assert_eq!(arcade.game().unwrap().kind(), GameKind::Feud);
    }

    #[test]
    fn closing_invalidates_pending_load() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut arcade = Arcade::default();
        let ticket = arcade.open_game(GameKind::Riddle, &mut rng).unwrap();
        arcade.close_game();
        assert!(
            arcade
                .deliver(ticket, GameContent::Riddle(fallback_riddle()), &mut rng)
                .is_err()
        );
        assert!(arcade.slot().is_none());
    }

    #[test]
    fn mismatched_content_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut arcade = Arcade::default();
        let ticket = arcade.open_game(GameKind::Riddle, &mut rng).unwrap();
        assert!(matches!(
            arcade.deliver(ticket, GameContent::Feud(fallback_trivia()), &mut rng),
            Err(MoveError::InvalidInput(_))
        ));
        assert!(arcade.is_loading());
    }

    #[test]
    fn music_event_opens_panel() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut arcade = Arcade::default();
        arcade.apply(&ChatEvent::OpenMusic("rain sounds".into()), &mut rng);
        assert_eq!(arcade.music().unwrap().query(), "rain sounds");
        arcade.close_music();
        assert!(arcade.music().is_none());
    }

    #[test]
    fn tick_reaches_minesweeper_clock() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut arcade = Arcade::default();
        arcade.open_game(GameKind::Minesweeper, &mut rng);
        let mut field = Minefield::with_mines(3, 3, &[(0, 1)]).unwrap();
        field.reveal(0, 0, &mut rng).unwrap();
        *arcade.game_mut().unwrap() = ActiveGame::Minesweeper(field);
        arcade.tick();
        match arcade.game() {
            Some(ActiveGame::Minesweeper(field)) => assert_eq!(field.elapsed(), 1),
            other => panic!("unexpected game: {other:?}"),
        }
    }
}
