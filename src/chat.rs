//! Chat transcript and API-side session state.

use crate::llm_client::{ChatRequest, ChatTurn, Role};
use crate::persona::Persona;
use crate::tools::{self, ToolDeclaration};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Opaque, monotonic message id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(u64);

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum Author {
    /// The person chatting.
    User,
    /// The companion.
    Bot,
}

/// One transcript line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message id.
    pub id: MessageId,
    /// Author.
    pub author: Author,
    /// Text so far; bot messages grow while streaming.
    pub text: String,
}

/// Append-only list of messages shown to the user.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl Transcript {
    /// Empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns its id.
    pub fn push(&mut self, author: Author, text: impl Into<String>) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            author,
            text: text.into(),
        });
        id
    }

    /// Looks a message up.
    pub fn get(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Appends to a message's text, returning the new text.
    pub fn append(&mut self, id: MessageId, delta: &str) -> Option<&str> {
        let message = self.messages.iter_mut().find(|m| m.id == id)?;
        message.text.push_str(delta);
        Some(&message.text)
    }

    /// Replaces a message's text.
    pub fn replace(&mut self, id: MessageId, text: impl Into<String>) -> Option<&str> {
        let message = self.messages.iter_mut().find(|m| m.id == id)?;
        message.text = text.into();
        Some(&message.text)
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Most recent message.
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether there are no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Conversation state sent to the model with every turn.
#[derive(Debug, Clone)]
pub struct ChatSession {
    system_instruction: String,
    tools: Vec<ToolDeclaration>,
    history: Vec<ChatTurn>,
}

impl ChatSession {
    /// Creates a session for a persona.
    #[instrument]
    pub fn new(persona: Persona, companion: &str) -> Self {
        debug!("Creating chat session");
        Self {
            system_instruction: persona.system_instruction(companion),
            tools: tools::declarations(),
            history: Vec::new(),
        }
    }

    /// System instruction.
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Committed turns.
    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Builds the request for a new user message.
    pub fn request(&self, message: &str) -> ChatRequest {
        ChatRequest {
            system_instruction: self.system_instruction.clone(),
            tools: self.tools.clone(),
            history: self.history.clone(),
            message: message.to_string(),
        }
    }

    /// Records a completed exchange.
    pub fn commit(&mut self, user: &str, reply: &str) {
        self.history.push(ChatTurn::new(Role::User, user.to_string()));
        self.history.push(ChatTurn::new(Role::Model, reply.to_string()));
        debug!(turns = self.history.len(), "Exchange committed");
    }
}
