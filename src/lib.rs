//! Companion library - a gentle chat partner with minigames
//!
//! A streaming, tool-calling chat drives a set of turn-based minigames.
//!
//! # Architecture
//!
//! - **Orchestrator**: streams replies from the language model into the
//!   transcript and turns `playGame` / `playMusic` calls into [`ChatEvent`]s
//! - **Arcade**: owns whichever game or music panel those events open
//! - **Content**: one-shot generated riddles, trivia, debate turns and songs,
//!   with fixed fallbacks
//! - **Games**: the engines live in the `companion_games` crate
//!
//! # Example
//!
//! ```no_run
//! use companion::{ChatOrchestrator, CompanionConfig, LanguageModel, LlmClient};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = CompanionConfig::default();
//! let client = LlmClient::new(config.create_llm_config()?);
//! let model: Arc<dyn LanguageModel> = Arc::new(client);
//!
//! let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut chat = ChatOrchestrator::new(Some(model), *config.persona(), config.name().clone(), tx);
//! chat.send_user_message("I could use a break").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod arcade;
mod chat;
mod config;
mod console;
mod content;
mod llm_client;
mod music;
mod orchestrator;
mod persona;
mod play;
mod timers;
mod tools;

// Crate-level exports - Configuration
pub use config::{API_KEY_VARS, CompanionConfig, ConfigError};

// Crate-level exports - LLM client
pub use llm_client::{
    ChatChunk, ChatRequest, ChatTurn, ChunkStream, LanguageModel, LlmClient, LlmConfig, LlmError,
    Role, ToolCall,
};

// Crate-level exports - Tools
pub use tools::{PLAY_GAME, PLAY_MUSIC, ToolDeclaration, ToolError, ToolInvocation, declarations};

// Crate-level exports - Chat
pub use chat::{Author, ChatMessage, ChatSession, MessageId, Transcript};
pub use orchestrator::{
    APOLOGY, ChatError, ChatEvent, ChatOrchestrator, NOT_CONFIGURED, TurnOutcome, TurnReport,
};
pub use persona::{Persona, greeting};

// Crate-level exports - Content
pub use content::{
    CHAT_FALLBACK, ContentAdapter, GameContent, WISDOM_FALLBACK, fallback_debate,
    fallback_rebuttal, fallback_riddle, fallback_songs, fallback_trivia, response_schema,
};

// Crate-level exports - Arcade
pub use arcade::{ActiveGame, Arcade, ArcadeSettings, GameSlot, LoadTicket};
pub use music::MusicPanel;
pub use play::apply_input;
pub use timers::{
    GameClock, OPPONENT_DELAY, Pacing, REVEAL_DELAY, TICK, opponent_turn, settle_memory,
};

// Crate-level exports - Terminal loops
pub use console::{
    DebateUpdate, Lines, LoopExit, PlayUpdate, QUIT_COMMANDS, play_game, run_debate, stdin_lines,
};
