//! Streaming chat turns with tool-call interception.

use crate::chat::{Author, ChatMessage, ChatSession, MessageId, Transcript};
use crate::llm_client::{ChatChunk, LanguageModel, LlmError};
use crate::persona::{self, Persona};
use crate::tools::ToolInvocation;
use companion_games::GameKind;
use derive_more::{Display, Error};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Reply shown when a turn fails.
pub const APOLOGY: &str = "Sorry, I encountered a problem. Please try again.";

/// Reply shown when no credential is configured.
pub const NOT_CONFIGURED: &str = "API Key not configured.";

/// Messages sent from orchestrator to UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// A message was appended to the transcript.
    MessageAdded(ChatMessage),
    /// A bot message's text changed.
    BotText {
        /// Message being streamed.
        id: MessageId,
        /// Full text so far.
        text: String,
    },
    /// The model asked to open a game.
    OpenGame(GameKind),
    /// The model asked to play music.
    OpenMusic(String),
    /// The turn failed; the message now holds the apology.
    StreamFailed {
        /// Message that failed.
        id: MessageId,
        /// What went wrong.
        reason: String,
    },
}

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The stream finished and the exchange was committed.
    Completed,
    /// The stream failed; the apology is shown.
    Failed,
    /// No model configured; nothing was sent.
    NotConfigured,
    /// The event receiver went away mid-stream.
    Abandoned,
}

/// Result of one user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnReport {
    /// The bot message created for this turn.
    pub reply: MessageId,
    /// How the turn ended.
    pub outcome: TurnOutcome,
}

/// Rejected user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum ChatError {
    /// Blank messages are not sent.
    #[display("Message is empty")]
    EmptyMessage,
}

/// Owns the transcript and chat session and drives streaming turns.
pub struct ChatOrchestrator {
    model: Option<Arc<dyn LanguageModel>>,
    persona: Persona,
    companion: String,
    session: Option<ChatSession>,
    transcript: Transcript,
    event_tx: mpsc::UnboundedSender<ChatEvent>,
}

impl ChatOrchestrator {
    /// Creates an orchestrator and seeds the greeting.
    #[instrument(skip(model, event_tx), fields(configured = model.is_some()))]
    pub fn new(
        model: Option<Arc<dyn LanguageModel>>,
        persona: Persona,
        companion: String,
        event_tx: mpsc::UnboundedSender<ChatEvent>,
    ) -> Self {
        let mut transcript = Transcript::new();
        transcript.push(Author::Bot, persona::greeting(&companion));
        info!("Chat orchestrator ready");
        Self {
            model,
            persona,
            companion,
            session: None,
            transcript,
            event_tx,
        }
    }

    /// Transcript so far.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Active session, if one was started.
    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    /// Current persona.
    pub fn persona(&self) -> Persona {
        self.persona
    }

    /// Starts the session if needed and returns it.
    #[instrument(skip(self))]
    pub fn start_session(&mut self) -> &mut ChatSession {
        self.session
            .get_or_insert_with(|| ChatSession::new(self.persona, &self.companion))
    }

    /// Drops the session; the next turn starts a fresh one.
    #[instrument(skip(self))]
    pub fn reset_session(&mut self) {
        if self.session.take().is_some() {
            info!("Chat session reset");
        }
    }

    /// Switches persona, which resets the session.
    #[instrument(skip(self))]
    pub fn set_persona(&mut self, persona: Persona) {
        self.persona = persona;
        self.reset_session();
    }

    /// Sends a user message and streams the reply into the transcript.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub async fn send_user_message(&mut self, text: &str) -> Result<TurnReport, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring blank message");
            return Err(ChatError::EmptyMessage);
        }

        self.push(Author::User, text);
        let reply = self.push(Author::Bot, "");

        let Some(model) = self.model.clone() else {
            warn!("No language model configured");
            self.replace(reply, NOT_CONFIGURED);
            return Ok(TurnReport {
                reply,
                outcome: TurnOutcome::NotConfigured,
            });
        };

        let request = self.start_session().request(text);
        let mut stream = match model.stream_chat(request).await {
            Ok(stream) => stream,
            Err(e) => return Ok(self.fail(reply, e)),
        };

        while let Some(item) = stream.next().await {
            if self.event_tx.is_closed() {
                info!("Event receiver dropped, abandoning turn");
                return Ok(TurnReport {
                    reply,
                    outcome: TurnOutcome::Abandoned,
                });
            }
            match item {
                Ok(chunk) => self.apply_chunk(reply, chunk),
                Err(e) => return Ok(self.fail(reply, e)),
            }
        }

        let reply_text = self
            .transcript
            .get(reply)
            .map(|m| m.text.clone())
            .unwrap_or_default();
        if reply_text.trim().is_empty() {
            warn!("Model returned an empty reply");
        } else {
            self.start_session().commit(text, &reply_text);
        }
        info!(reply_len = reply_text.len(), "Turn complete");
        Ok(TurnReport {
            reply,
            outcome: TurnOutcome::Completed,
        })
    }

    /// Tool calls first, then text.
    fn apply_chunk(&mut self, reply: MessageId, chunk: ChatChunk) {
        for call in &chunk.tool_calls {
            match ToolInvocation::from_call(call) {
                Ok(invocation) => {
                    let event = match &invocation {
                        ToolInvocation::PlayGame(kind) => ChatEvent::OpenGame(*kind),
                        ToolInvocation::PlayMusic(query) => ChatEvent::OpenMusic(query.clone()),
                    };
                    info!(?event, "Tool call handled");
                    self.emit(event);
                    self.append(reply, &invocation.confirmation());
                }
                Err(e) => warn!(error = %e, "Ignoring tool call"),
            }
        }
        if let Some(text) = chunk.text.filter(|t| !t.is_empty()) {
            self.append(reply, &text);
        }
    }

    fn fail(&mut self, reply: MessageId, e: LlmError) -> TurnReport {
        error!(error = %e, "Chat turn failed");
        self.replace(reply, APOLOGY);
        self.emit(ChatEvent::StreamFailed {
            id: reply,
            reason: e.message,
        });
        TurnReport {
            reply,
            outcome: TurnOutcome::Failed,
        }
    }

    fn push(&mut self, author: Author, text: &str) -> MessageId {
        let id = self.transcript.push(author, text);
        if let Some(message) = self.transcript.get(id) {
            self.emit(ChatEvent::MessageAdded(message.clone()));
        }
        id
    }

    fn append(&mut self, id: MessageId, delta: &str) {
        if let Some(text) = self.transcript.append(id, delta) {
            let text = text.to_string();
            self.emit(ChatEvent::BotText { id, text });
        }
    }

    fn replace(&mut self, id: MessageId, text: &str) {
        if self.transcript.replace(id, text).is_some() {
            self.emit(ChatEvent::BotText {
                id,
                text: text.to_string(),
            });
        }
    }

    fn emit(&self, event: ChatEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("Event receiver gone");
        }
    }
}
