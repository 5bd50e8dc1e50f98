//! Companion - Unified CLI
//!
//! Terminal chat with the companion, plus direct access to the minigames and
//! generated content.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use companion::{
    ActiveGame, Arcade, Author, ChatEvent, ChatOrchestrator, CompanionConfig, ContentAdapter,
    DebateUpdate, GameClock, LanguageModel, Lines, LlmClient, LoopExit, MessageId, Pacing,
    PlayUpdate, QUIT_COMMANDS, play_game, run_debate, stdin_lines,
};
use companion_games::{Feud, GameKind, Status};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let model = build_model(&config);
    let adapter = ContentAdapter::new(model.clone());

    match cli.command {
        Command::Chat => run_chat(&config, model, &adapter, &mut stdin_lines()).await,
        Command::Play { game } => run_play(&config, &adapter, game, &mut stdin_lines()).await,
        Command::Riddle => run_play(&config, &adapter, GameKind::Riddle, &mut stdin_lines()).await,
        Command::Feud => run_play(&config, &adapter, GameKind::Feud, &mut stdin_lines()).await,
        Command::Debate => run_play(&config, &adapter, GameKind::Debate, &mut stdin_lines()).await,
        Command::Songs { mood } => {
            for song in adapter.songs(&mood).await.songs {
                println!("{} - {}", song.title, song.artist);
            }
            Ok(())
        }
        Command::Wisdom => {
            println!("{}", adapter.daily_wisdom().await);
            Ok(())
        }
    }
}

/// Loads the config file and applies command-line overrides.
#[instrument(skip(cli))]
fn load_config(cli: &Cli) -> Result<CompanionConfig> {
    let mut config = CompanionConfig::load_or_default(&cli.config)?;
    if let Some(model) = &cli.model {
        config = config.with_model(model.clone());
    }
    if let Some(persona) = cli.persona {
        config = config.with_persona(persona);
    }
    info!(model = %config.model(), persona = %config.persona(), "Configuration ready");
    Ok(config)
}

/// Builds the model client, or `None` when no credential is available.
fn build_model(config: &CompanionConfig) -> Option<Arc<dyn LanguageModel>> {
    match config.create_llm_config() {
        Ok(llm_config) => Some(Arc::new(LlmClient::new(llm_config))),
        Err(e) => {
            warn!(error = %e, "Running without a language model");
            None
        }
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

// ─────────────────────────────────────────────────────────────
//  Chat
// ─────────────────────────────────────────────────────────────

/// Runs the chat REPL.
#[instrument(skip_all)]
async fn run_chat(
    config: &CompanionConfig,
    model: Option<Arc<dyn LanguageModel>>,
    adapter: &ContentAdapter,
    lines: &mut Lines,
) -> Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let mut orchestrator =
        ChatOrchestrator::new(model, *config.persona(), config.name().clone(), event_tx);
    let arcade = Arc::new(Mutex::new(Arcade::new(config.arcade_settings())));
    let printer = tokio::spawn(print_events(event_rx, adapter.clone(), arcade.clone()));

    if let Some(greeting) = orchestrator.transcript().last() {
        println!("{}", greeting.text);
    }
    println!("(type /play to play an open game, /reset to start over, /quit to leave)");

    let mut rng = StdRng::from_entropy();
    loop {
        prompt();
        let Some(line) = lines.recv().await else {
            break;
        };
        match line.trim() {
            "" => continue,
            command if QUIT_COMMANDS.contains(&command) => break,
            "/reset" => {
                orchestrator.reset_session();
                println!("Starting fresh.");
            }
            "/play" => {
                let mut guard = arcade.lock().await;
                if guard.is_loading() {
                    println!("The game is still being set up, try again in a moment.");
                    continue;
                }
                let exit = play_open_game(&mut guard, adapter, config.pacing(), lines, &mut rng).await;
                if let LoopExit::Finished(_) = exit {
                    guard.close_game();
                }
                if exit == LoopExit::InputClosed {
                    break;
                }
                println!("Back to chatting.");
            }
            text => {
                let report = orchestrator.send_user_message(text).await?;
                debug!(?report, "Turn finished");
                // Let the printer catch up before the next prompt.
                tokio::task::yield_now().await;
                println!();
            }
        }
    }

    drop(orchestrator);
    printer.await?;
    Ok(())
}

/// Prints streamed text and opens whatever the companion asks for.
async fn print_events(
    mut events: mpsc::UnboundedReceiver<ChatEvent>,
    adapter: ContentAdapter,
    arcade: Arc<Mutex<Arcade>>,
) {
    let mut rng = StdRng::from_entropy();
    let mut printed: HashMap<MessageId, String> = HashMap::new();

    while let Some(event) = events.recv().await {
        match &event {
            ChatEvent::MessageAdded(message) if message.author == Author::Bot => {
                print!("{}", message.text);
                printed.insert(message.id, message.text.clone());
            }
            ChatEvent::BotText { id, text } => {
                let shown = printed.entry(*id).or_default();
                match text.strip_prefix(shown.as_str()) {
                    Some(delta) => print!("{delta}"),
                    None => print!("\n{text}"),
                }
                *shown = text.clone();
            }
            ChatEvent::OpenGame(kind) => {
                let ticket = arcade.lock().await.apply(&event, &mut rng);
                if let Some(ticket) = ticket {
                    if let Some(content) = adapter.load(ticket.kind()).await {
                        let delivered = arcade.lock().await.deliver(ticket, content, &mut rng);
                        if let Err(e) = delivered {
                            warn!(error = %e, "Content arrived too late");
                        }
                    }
                }
                if let Some(game) = arcade.lock().await.game() {
                    println!("\n[{}]\n{}", kind.title(), game.render());
                    println!("(type /play to play it)");
                }
            }
            ChatEvent::OpenMusic(_) => {
                let mut guard = arcade.lock().await;
                guard.apply(&event, &mut rng);
                if let Some(panel) = guard.music() {
                    println!("\n[Music] {}", panel.embed_url());
                }
            }
            ChatEvent::StreamFailed { reason, .. } => debug!(%reason, "Turn failed"),
            ChatEvent::MessageAdded(_) => {}
        }
        let _ = std::io::stdout().flush();
    }
}

// ─────────────────────────────────────────────────────────────
//  Games
// ─────────────────────────────────────────────────────────────

/// Opens one game and plays it in the terminal.
#[instrument(skip(config, adapter, lines))]
async fn run_play(
    config: &CompanionConfig,
    adapter: &ContentAdapter,
    kind: GameKind,
    lines: &mut Lines,
) -> Result<()> {
    let mut rng = StdRng::from_entropy();
    let mut arcade = Arcade::new(config.arcade_settings());
    if let Some(ticket) = arcade.open_game(kind, &mut rng) {
        if let Some(content) = adapter.load(kind).await {
            arcade.deliver(ticket, content, &mut rng)?;
        }
    }
    if arcade.game().is_none() {
        anyhow::bail!("{kind} could not be started");
    }

    play_open_game(&mut arcade, adapter, config.pacing(), lines, &mut rng).await;
    Ok(())
}

/// Plays whatever game the arcade has open until it ends or the player leaves.
async fn play_open_game(
    arcade: &mut Arcade,
    adapter: &ContentAdapter,
    pacing: Pacing,
    lines: &mut Lines,
    rng: &mut StdRng,
) -> LoopExit {
    let Some(game) = arcade.game() else {
        println!("No game is open.");
        return LoopExit::Quit;
    };
    println!("[{}]\n{}", game.kind().title(), game.render());

    let mut clock = GameClock::default();
    let exit = match arcade.game_mut() {
        Some(ActiveGame::Debate(debate)) => {
            run_debate(debate, adapter, lines, &mut clock, show_debate).await
        }
        Some(_) => play_game(arcade, lines, &mut clock, pacing, rng, show_play).await,
        None => LoopExit::Quit,
    };
    debug!(?exit, "Left game");

    if let Some(game) = arcade.game() {
        report_result(game);
    }
    exit
}

fn show_play(update: PlayUpdate) {
    match update {
        PlayUpdate::Board(board) => println!("{board}"),
        PlayUpdate::Rejected(e) => println!("{e}"),
        PlayUpdate::Thinking => println!("thinking..."),
        PlayUpdate::OpponentMoved(pos) => println!("O takes {pos}"),
    }
}

fn show_debate(update: DebateUpdate) {
    match update {
        DebateUpdate::Rebuttal { text, remaining } => {
            println!("Opponent: {text}");
            println!("({remaining}s left)");
        }
        DebateUpdate::Rejected(e) => println!("{e}"),
        DebateUpdate::TimeUp => println!("Time's up!"),
    }
}

fn report_result(game: &ActiveGame) {
    match (game, game.status()) {
        (ActiveGame::Debate(debate), Status::Draw) => {
            println!("You made {} arguments.", debate.history().len());
        }
        (ActiveGame::Feud(feud), Status::Lost) => {
            println!("Three strikes! The board was:");
            println!("{}", reveal_feud(feud));
        }
        (ActiveGame::WordGuess(g), Status::Lost) => println!("The word was {}.", g.secret()),
        (_, Status::Won) => println!("You did it!"),
        (_, Status::Lost) => println!("Better luck next time."),
        (_, Status::Draw) => println!("It's a draw."),
        (_, Status::InProgress) => {}
    }
}

fn reveal_feud(feud: &Feud) -> String {
    feud.answers_for_display()
        .iter()
        .map(|slot| format!("{} ({})", slot.answer, slot.points))
        .collect::<Vec<_>>()
        .join("\n")
}
