//! Companion configuration.

use crate::arcade::ArcadeSettings;
use crate::llm_client::LlmConfig;
use crate::persona::Persona;
use crate::timers::Pacing;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Environment variables checked for the API credential, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Configuration for the companion.
#[derive(Debug, Clone, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct CompanionConfig {
    /// Name the companion introduces itself with.
    #[serde(default = "default_name")]
    name: String,

    /// Personality layered on top of the base persona.
    #[serde(default)]
    persona: Persona,

    /// Model identifier (e.g., "gemini-2.5-flash").
    #[serde(default = "default_model")]
    model: String,

    /// Base URL of the generative-language API.
    #[serde(default = "default_api_base")]
    api_base: String,

    /// Timeout for one-shot requests, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,

    /// Delay before the tic-tac-toe opponent moves, in milliseconds.
    #[serde(default = "default_opponent_delay_ms")]
    opponent_delay_ms: u64,

    /// Delay before a face-up memory pair is turned back, in milliseconds.
    #[serde(default = "default_reveal_delay_ms")]
    reveal_delay_ms: u64,

    /// Minesweeper board height.
    #[serde(default = "default_mine_rows")]
    mine_rows: usize,

    /// Minesweeper board width.
    #[serde(default = "default_mine_cols")]
    mine_cols: usize,

    /// Minesweeper mine count.
    #[serde(default = "default_mine_count")]
    mine_count: usize,
}

fn default_name() -> String {
    "Spirit".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_opponent_delay_ms() -> u64 {
    500
}

fn default_reveal_delay_ms() -> u64 {
    1000
}

fn default_mine_rows() -> usize {
    companion_games::DEFAULT_ROWS
}

fn default_mine_cols() -> usize {
    companion_games::DEFAULT_COLS
}

fn default_mine_count() -> usize {
    companion_games::DEFAULT_MINES
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            persona: Persona::default(),
            model: default_model(),
            api_base: default_api_base(),
            request_timeout_secs: default_request_timeout_secs(),
            opponent_delay_ms: default_opponent_delay_ms(),
            reveal_delay_ms: default_reveal_delay_ms(),
            mine_rows: default_mine_rows(),
            mine_cols: default_mine_cols(),
            mine_count: default_mine_count(),
        }
    }
}

impl CompanionConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(name = %config.name, model = %config.model, "Config loaded successfully");
        Ok(config)
    }

    /// Loads the file if it exists, otherwise falls back to defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// One-shot request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Tic-tac-toe opponent delay.
    pub fn opponent_delay(&self) -> Duration {
        Duration::from_millis(self.opponent_delay_ms)
    }

    /// Memory mismatch delay.
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    /// Both move delays.
    pub fn pacing(&self) -> Pacing {
        Pacing::new(self.opponent_delay(), self.reveal_delay())
    }

    /// Board settings for the arcade.
    pub fn arcade_settings(&self) -> ArcadeSettings {
        ArcadeSettings::new(self.mine_rows, self.mine_cols, self.mine_count)
    }

    /// Creates LLM configuration from this config.
    /// Requires GEMINI_API_KEY (or API_KEY) in the environment.
    #[instrument(skip(self), fields(model = %self.model))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|key| !key.trim().is_empty()))
            .ok_or_else(|| {
                warn!("No API key in environment");
                ConfigError::new(format!(
                    "{} environment variable not set",
                    API_KEY_VARS.join(" or ")
                ))
            })?;

        Ok(LlmConfig::new(
            api_key,
            self.model.clone(),
            self.api_base.clone(),
            self.request_timeout(),
        ))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
