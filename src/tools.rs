//! Functions the model may call during chat.

use crate::llm_client::ToolCall;
use companion_games::GameKind;
use derive_more::{Display, Error};
use serde::Serialize;
use serde_json::{Value, json};
use std::str::FromStr;
use tracing::{debug, instrument, warn};

/// Name of the game-launching tool.
pub const PLAY_GAME: &str = "playGame";

/// Name of the music tool.
pub const PLAY_MUSIC: &str = "playMusic";

/// A function declaration in the API's shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDeclaration {
    /// Function name.
    pub name: String,
    /// What the function does, for the model.
    pub description: String,
    /// JSON schema of the arguments.
    pub parameters: Value,
}

/// Declarations for `playGame` and `playMusic`.
pub fn declarations() -> Vec<ToolDeclaration> {
    vec![
        ToolDeclaration {
            name: PLAY_GAME.to_string(),
            description: "Opens a relaxing minigame for the user. Use this when the user is \
                          bored, stressed, or asks to play a game."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "gameType": {
                        "type": "string",
                        "description": "The type of game to play.",
                        "enum": GameKind::identifiers(),
                    }
                },
                "required": ["gameType"],
            }),
        },
        ToolDeclaration {
            name: PLAY_MUSIC.to_string(),
            description: "Plays music for the user. Use this when the user asks for music \
                          or a song, or seems to need a mood lift."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query for the music, e.g. 'calm piano'.",
                    }
                },
                "required": ["query"],
            }),
        },
    ]
}

/// A recognised tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocation {
    /// Open a minigame.
    PlayGame(GameKind),
    /// Open the music panel with a search query.
    PlayMusic(String),
}

impl ToolInvocation {
    /// Interprets a raw call from the model.
    #[instrument(skip(call), fields(name = %call.name))]
    pub fn from_call(call: &ToolCall) -> Result<Self, ToolError> {
        let string_arg = |arg: &'static str| {
            call.args
                .get(arg)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or(ToolError::MissingArgument {
                    tool: call.name.clone(),
                    arg,
                })
        };

        let invocation = match call.name.as_str() {
            PLAY_GAME => {
                let id = string_arg("gameType")?;
                let kind = GameKind::from_str(id).map_err(|_| {
                    warn!(id, "Model asked for an unknown game");
                    ToolError::UnknownGame(id.to_string())
                })?;
                Self::PlayGame(kind)
            }
            PLAY_MUSIC => Self::PlayMusic(string_arg("query")?.to_string()),
            other => {
                warn!(name = other, "Model called an unknown tool");
                return Err(ToolError::UnknownTool(other.to_string()));
            }
        };
        debug!(?invocation, "Tool call recognised");
        Ok(invocation)
    }

    /// Line appended to the bot's reply once the tool has run.
    pub fn confirmation(&self) -> String {
        match self {
            Self::PlayGame(kind) => {
                format!("\nI've opened the {} game for you to relax your mind.", kind)
            }
            Self::PlayMusic(query) => {
                format!("\nI found some music that might help: \"{}\"", query)
            }
        }
    }
}

/// Why a tool call was ignored.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ToolError {
    /// No such tool.
    #[display("Unknown tool: {}", _0)]
    UnknownTool(#[error(not(source))] String),
    /// `playGame` named a game that does not exist.
    #[display("Unknown game: {}", _0)]
    UnknownGame(#[error(not(source))] String),
    /// A required argument was absent or blank.
    #[display("{} is missing argument {}", tool, arg)]
    MissingArgument {
        /// Tool name.
        tool: String,
        /// Argument name.
        arg: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_enum_lists_every_identifier() {
        let decls = declarations();
        let ids = decls[0].parameters["properties"]["gameType"]["enum"]
            .as_array()
            .unwrap()
            .len();
        assert_eq!(ids, GameKind::identifiers().len());
        assert_eq!(decls[1].name, PLAY_MUSIC);
    }

    #[test]
    fn aliases_resolve_to_canonical_games() {
        let call = ToolCall::new(PLAY_GAME.into(), json!({"gameType": "Hangman"}));
        assert_eq!(
            ToolInvocation::from_call(&call).unwrap(),
            ToolInvocation::PlayGame(GameKind::WordGuess)
        );
    }

    #[test]
    fn unknown_game_and_tool_rejected() {
        let call = ToolCall::new(PLAY_GAME.into(), json!({"gameType": "chess"}));
        assert_eq!(
            ToolInvocation::from_call(&call),
            Err(ToolError::UnknownGame("chess".into()))
        );
        let call = ToolCall::new("orderPizza".into(), json!({}));
        assert!(matches!(
            ToolInvocation::from_call(&call),
            Err(ToolError::UnknownTool(_))
        ));
    }

    #[test]
    fn music_requires_query() {
        let call = ToolCall::new(PLAY_MUSIC.into(), json!({"query": "  "}));
        assert!(matches!(
            ToolInvocation::from_call(&call),
            Err(ToolError::MissingArgument { arg: "query", .. })
        ));
    }

    #[test]
    fn confirmations_name_the_target() {
        assert_eq!(
            ToolInvocation::PlayGame(GameKind::Memory).confirmation(),
            "\nI've opened the memory game for you to relax your mind."
        );
        assert_eq!(
            ToolInvocation::PlayMusic("calm piano".into()).confirmation(),
            "\nI found some music that might help: \"calm piano\""
        );
    }
}
