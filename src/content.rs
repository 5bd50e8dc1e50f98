//! One-shot generated content with fixed fallbacks.
//!
//! Every request is a single call with no retry. Any failure (no model,
//! transport, parse, or a record that fails validation) yields the fallback
//! for that content type, so callers always get something playable.

use crate::llm_client::{LanguageModel, LlmError};
use crate::orchestrator::NOT_CONFIGURED;
use companion_games::{
    Debate, DebateTurn, GameKind, MAX_FEUD_ANSWERS, Riddle, Song, SongList, TriviaAnswer,
    TriviaSet,
};
use futures::FutureExt;
use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Shown when the daily insight cannot be generated.
pub const WISDOM_FALLBACK: &str = "Breathe in, breathe out. Today is a new day.";

/// Shown when a one-shot chat reply cannot be generated.
pub const CHAT_FALLBACK: &str =
    "I'm having trouble connecting right now, but I'm still here with you. Please try again in a moment.";

/// Content a game needs before it can start.
#[derive(Debug, Clone, PartialEq)]
pub enum GameContent {
    /// A riddle to solve.
    Riddle(Riddle),
    /// A survey question.
    Feud(TriviaSet),
    /// A debate topic and opening.
    Debate(DebateTurn),
}

impl GameContent {
    /// Game this content belongs to.
    pub fn kind(&self) -> GameKind {
        match self {
            GameContent::Riddle(_) => GameKind::Riddle,
            GameContent::Feud(_) => GameKind::Feud,
            GameContent::Debate(_) => GameKind::Debate,
        }
    }
}

/// Fallback riddle.
pub fn fallback_riddle() -> Riddle {
    Riddle::new(
        "What has keys but can't open locks?".to_string(),
        "A piano".to_string(),
    )
}

/// Fallback survey question.
pub fn fallback_trivia() -> TriviaSet {
    TriviaSet::new(
        "Name something people do to relax".to_string(),
        vec![
            TriviaAnswer::new("Read a book".to_string(), 35),
            TriviaAnswer::new("Take a bath".to_string(), 25),
            TriviaAnswer::new("Meditate".to_string(), 20),
            TriviaAnswer::new("Listen to music".to_string(), 12),
            TriviaAnswer::new("Go for a walk".to_string(), 8),
        ],
    )
}

/// Fallback debate opening.
pub fn fallback_debate() -> DebateTurn {
    DebateTurn::new(
        "Is it better to be a morning person or a night owl?".to_string(),
        "Mornings belong to the clear-headed. The quiet hours before the world wakes \
         are the most productive of the day."
            .to_string(),
    )
}

/// Fallback rebuttal when the opponent cannot answer.
pub fn fallback_rebuttal() -> String {
    "An interesting point, but I'm not convinced. What evidence do you have?".to_string()
}

/// Fallback song suggestions.
pub fn fallback_songs() -> SongList {
    SongList::new(vec![
        Song::new("Weightless".to_string(), "Marconi Union".to_string()),
        Song::new("Clair de Lune".to_string(), "Claude Debussy".to_string()),
        Song::new("Here Comes the Sun".to_string(), "The Beatles".to_string()),
    ])
}

/// Response schema for a record type, without the meta-schema marker.
pub fn response_schema<T: JsonSchema>() -> Value {
    let mut schema: Value = schemars::schema_for!(T).into();
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
    }
    schema
}

/// Wraps the language model for one-shot content requests.
#[derive(Clone, Default)]
pub struct ContentAdapter {
    model: Option<Arc<dyn LanguageModel>>,
}

impl std::fmt::Debug for ContentAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentAdapter")
            .field("configured", &self.model.is_some())
            .finish()
    }
}

impl ContentAdapter {
    /// Creates an adapter; `None` means every request falls back.
    pub fn new(model: Option<Arc<dyn LanguageModel>>) -> Self {
        Self { model }
    }

    /// Whether a model is configured.
    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    fn model(&self) -> Result<&Arc<dyn LanguageModel>, LlmError> {
        self.model
            .as_ref()
            .ok_or_else(|| LlmError::new("API key not configured".to_string()))
    }

    #[instrument(skip(self, prompt))]
    async fn request<T>(&self, what: &'static str, prompt: &str) -> Result<T, LlmError>
    where
        T: DeserializeOwned + JsonSchema,
    {
        let value = self
            .model()?
            .generate_json(prompt, response_schema::<T>())
            .await?;
        debug!(%value, "Structured response");
        serde_json::from_value(value)
            .map_err(|e| LlmError::new(format!("Malformed {} response: {}", what, e)))
    }

    /// A fresh riddle.
    #[instrument(skip(self))]
    pub async fn riddle(&self) -> Riddle {
        let prompt = "Create a short, clever, family-friendly riddle that is not too \
                      well known. Return the riddle and its short answer.";
        match self.request::<Riddle>("riddle", prompt).await {
            Ok(r) if !r.riddle.trim().is_empty() && !r.answer.trim().is_empty() => {
                info!("Riddle generated");
                r
            }
            Ok(_) => {
                warn!("Riddle response was empty, using fallback");
                fallback_riddle()
            }
            Err(e) => {
                warn!(error = %e, "Riddle request failed, using fallback");
                fallback_riddle()
            }
        }
    }

    /// A survey question with at most five ranked answers.
    #[instrument(skip(self))]
    pub async fn feud_question(&self) -> TriviaSet {
        let prompt = format!(
            "Create a light-hearted family-feud style survey question. Give the {} most \
             popular answers with point values that add up to at most 100, highest first.",
            MAX_FEUD_ANSWERS
        );
        match self.request::<TriviaSet>("trivia", &prompt).await {
            Ok(set) => {
                let set = set.truncated();
                let usable = !set.question.trim().is_empty()
                    && !set.answers.is_empty()
                    && set.answers.iter().all(|a| !a.answer.trim().is_empty());
                if usable {
                    info!(answers = set.answers.len(), "Trivia generated");
                    set
                } else {
                    warn!("Trivia response failed validation, using fallback");
                    fallback_trivia()
                }
            }
            Err(e) => {
                warn!(error = %e, "Trivia request failed, using fallback");
                fallback_trivia()
            }
        }
    }

    /// Opens a debate on `topic` (or a topic of the model's choosing), or
    /// rebuts the last argument of `transcript`.
    #[instrument(skip(self, transcript), fields(exchanges = transcript.len()))]
    pub async fn debate_turn(
        &self,
        topic: Option<&str>,
        transcript: &[(String, String)],
    ) -> DebateTurn {
        let prompt = match topic {
            None => "Pick a fun, light-hearted debate topic that people can reasonably \
                     disagree on. Return the topic and a short opening statement (two \
                     sentences at most) taking one side."
                .to_string(),
            Some(topic) => {
                let history = transcript
                    .iter()
                    .map(|(argument, rebuttal)| format!("Them: {argument}\nYou: {rebuttal}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!(
                    "You are a witty but fair debate opponent. The topic is \"{topic}\".\n\
                     {history}\n\
                     Reply to their latest argument with a short rebuttal (two sentences at \
                     most). Return the topic unchanged and your rebuttal as the response."
                )
            }
        };

        match self.request::<DebateTurn>("debate", &prompt).await {
            Ok(turn) if !turn.topic.trim().is_empty() && !turn.response.trim().is_empty() => {
                info!("Debate turn generated");
                turn
            }
            Ok(_) => {
                warn!("Debate response was empty, using fallback");
                self.debate_fallback(topic)
            }
            Err(e) => {
                warn!(error = %e, "Debate request failed, using fallback");
                self.debate_fallback(topic)
            }
        }
    }

    fn debate_fallback(&self, topic: Option<&str>) -> DebateTurn {
        match topic {
            None => fallback_debate(),
            Some(topic) => DebateTurn::new(topic.to_string(), fallback_rebuttal()),
        }
    }

    /// The opponent's rebuttal for a debate's pending argument.
    ///
    /// The request works on a snapshot of the debate, so the debate itself
    /// stays free to tick while the reply is in flight.
    pub fn rebuttal(&self, debate: &Debate) -> BoxFuture<'static, String> {
        let adapter = self.clone();
        let topic = debate.topic().to_string();
        let transcript = debate.transcript();
        debug!(%topic, exchanges = transcript.len(), "Requesting rebuttal");
        async move {
            adapter
                .debate_turn(Some(&topic), &transcript)
                .await
                .response
        }
        .boxed()
    }

    /// Songs that suit a mood.
    #[instrument(skip(self))]
    pub async fn songs(&self, mood: &str) -> SongList {
        let prompt = format!(
            "Suggest three songs for someone who is feeling {mood}. Prefer calming or \
             uplifting music. Return each song's title and artist."
        );
        match self.request::<SongList>("songs", &prompt).await {
            Ok(list) if !list.songs.is_empty() => {
                info!(count = list.songs.len(), "Songs suggested");
                list
            }
            Ok(_) => {
                warn!("Song list was empty, using fallback");
                fallback_songs()
            }
            Err(e) => {
                warn!(error = %e, "Song request failed, using fallback");
                fallback_songs()
            }
        }
    }

    /// A single non-streaming reply.
    #[instrument(skip(self, message))]
    pub async fn chat_reply(&self, message: &str) -> String {
        let result = match self.model() {
            Ok(model) => model.generate_text(message).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => CHAT_FALLBACK.to_string(),
            Err(e) => {
                warn!(error = %e, "Chat reply failed, using fallback");
                CHAT_FALLBACK.to_string()
            }
        }
    }

    /// A short insight for the day.
    ///
    /// Without a model this is the not-configured notice rather than the
    /// fallback insight.
    #[instrument(skip(self))]
    pub async fn daily_wisdom(&self) -> String {
        let prompt = "Give me one short, engaging, and non-denominational spiritual insight \
                      or thought-provoking question for the day. Make it unique and not a \
                      common quote. Max 20 words.";
        let Ok(model) = self.model() else {
            return NOT_CONFIGURED.to_string();
        };
        match model.generate_text(prompt).await {
            Ok(text) => {
                let text = text.trim().trim_matches('"').trim();
                if text.is_empty() {
                    WISDOM_FALLBACK.to_string()
                } else {
                    text.to_string()
                }
            }
            Err(e) => {
                warn!(error = %e, "Daily wisdom failed, using fallback");
                WISDOM_FALLBACK.to_string()
            }
        }
    }

    /// Fetches whatever `kind` needs to start, if anything.
    #[instrument(skip(self))]
    pub async fn load(&self, kind: GameKind) -> Option<GameContent> {
        match kind {
            GameKind::Riddle => Some(GameContent::Riddle(self.riddle().await)),
            GameKind::Feud => Some(GameContent::Feud(self.feud_question().await)),
            GameKind::Debate => Some(GameContent::Debate(self.debate_turn(None, &[]).await)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_has_no_meta_marker() {
        let schema = response_schema::<Riddle>();
        assert!(schema.get("$schema").is_none());
        assert!(schema["properties"].get("riddle").is_some());
        assert!(schema["properties"].get("answer").is_some());
    }

    #[tokio::test]
    async fn unconfigured_adapter_falls_back() {
        let adapter = ContentAdapter::new(None);
        assert_eq!(adapter.riddle().await, fallback_riddle());
        assert_eq!(adapter.feud_question().await.answers.len(), MAX_FEUD_ANSWERS);
        assert_eq!(adapter.songs("tired").await, fallback_songs());
        assert_eq!(adapter.chat_reply("hi").await, CHAT_FALLBACK);
    }

    #[tokio::test]
    async fn wisdom_without_model_reports_missing_key() {
        let adapter = ContentAdapter::new(None);
        assert_eq!(adapter.daily_wisdom().await, NOT_CONFIGURED);
    }

    #[tokio::test]
    async fn rebuttal_fallback_keeps_topic() {
        let adapter = ContentAdapter::new(None);
        let turn = adapter.debate_turn(Some("Tea or coffee"), &[]).await;
        assert_eq!(turn.topic, "Tea or coffee");
        assert_eq!(turn.response, fallback_rebuttal());
    }

    #[tokio::test]
    async fn rebuttal_outlives_the_borrow() {
        let adapter = ContentAdapter::new(None);
        let mut debate = Debate::with_side(fallback_debate(), companion_games::Side::For);
        debate.submit_argument("Snacks are better in the morning").unwrap();
        let request = adapter.rebuttal(&debate);
        debate.tick();
        assert_eq!(request.await, fallback_rebuttal());
    }

    #[tokio::test]
    async fn load_only_for_content_games() {
        let adapter = ContentAdapter::new(None);
        assert!(adapter.load(GameKind::Memory).await.is_none());
        let content = adapter.load(GameKind::Debate).await.unwrap();
        assert_eq!(content.kind(), GameKind::Debate);
    }
}
