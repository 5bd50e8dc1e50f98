//! Scripted language model shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use companion::{ChatChunk, ChatRequest, ChunkStream, LanguageModel, LlmError};
use futures::StreamExt;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// One scripted streaming turn.
pub enum Script {
    /// The stream cannot be opened.
    OpenFails,
    /// Items yielded in order.
    Chunks(Vec<Result<ChatChunk, LlmError>>),
}

/// Replays scripted replies and records every request.
#[derive(Default)]
pub struct ScriptedModel {
    turns: Mutex<VecDeque<Script>>,
    json: Mutex<VecDeque<Result<Value, LlmError>>>,
    text: Mutex<VecDeque<Result<String, LlmError>>>,
    pub requests: Mutex<Vec<ChatRequest>>,
    pub schemas: Mutex<Vec<Value>>,
    delay: Duration,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_turn(self, script: Script) -> Self {
        self.turns.lock().unwrap().push_back(script);
        self
    }

    pub fn with_json(self, reply: Result<Value, LlmError>) -> Self {
        self.json.lock().unwrap().push_back(reply);
        self
    }

    pub fn with_text(self, reply: Result<String, LlmError>) -> Self {
        self.text.lock().unwrap().push_back(reply);
        self
    }

    /// Makes every one-shot reply take `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn stream_chat(&self, request: ChatRequest) -> Result<ChunkStream, LlmError> {
        self.requests.lock().unwrap().push(request);
        let script = self
            .turns
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::Chunks(Vec::new()));
        match script {
            Script::OpenFails => Err(LlmError::new("connection refused".to_string())),
            Script::Chunks(items) => Ok(futures::stream::iter(items).boxed()),
        }
    }

    async fn generate_json(&self, _prompt: &str, schema: Value) -> Result<Value, LlmError> {
        self.schemas.lock().unwrap().push(schema);
        tokio::time::sleep(self.delay).await;
        self.json
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::new("no scripted json".to_string())))
    }

    async fn generate_text(&self, _prompt: &str) -> Result<String, LlmError> {
        self.text
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::new("no scripted text".to_string())))
    }
}
