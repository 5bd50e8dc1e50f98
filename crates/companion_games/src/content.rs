//! Structured content records produced by the language model.
//!
//! These double as response schemas: the content adapter derives the JSON
//! schema it sends with each request from the `JsonSchema` impls below.

use derive_new::new;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Maximum number of answers a feud board shows.
pub const MAX_FEUD_ANSWERS: usize = 5;

/// A riddle and its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, new)]
pub struct Riddle {
    /// The riddle text shown to the player.
    pub riddle: String,
    /// The expected answer.
    pub answer: String,
}

/// One ranked answer on a feud board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, new)]
pub struct TriviaAnswer {
    /// Answer text.
    pub answer: String,
    /// Points awarded when revealed.
    pub points: u32,
}

/// A survey-style question with ranked answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, new)]
pub struct TriviaSet {
    /// The survey question.
    pub question: String,
    /// Ranked answers, most popular first.
    pub answers: Vec<TriviaAnswer>,
}

impl TriviaSet {
    /// Drops answers beyond [`MAX_FEUD_ANSWERS`].
    pub fn truncated(mut self) -> Self {
        self.answers.truncate(MAX_FEUD_ANSWERS);
        self
    }
}

/// One opponent turn in a debate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, new)]
pub struct DebateTurn {
    /// Debate topic (echoed on follow-up turns).
    pub topic: String,
    /// The opponent's statement or rebuttal.
    pub response: String,
}

/// A song suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, new)]
pub struct Song {
    /// Song title.
    pub title: String,
    /// Performing artist.
    pub artist: String,
}

/// Wrapper matching the `{songs: [...]}` response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, new)]
pub struct SongList {
    /// Suggested songs.
    pub songs: Vec<Song>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_keeps_first_five() {
        let set = TriviaSet::new(
            "Name a fruit".into(),
            (0..8)
                .map(|i| TriviaAnswer::new(format!("fruit {i}"), 10 - i))
                .collect(),
        )
        .truncated();
        assert_eq!(set.answers.len(), MAX_FEUD_ANSWERS);
        assert_eq!(set.answers[0].answer, "fruit 0");
        assert_eq!(set.answers[4].answer, "fruit 4");
    }

    #[test]
    fn trivia_parses_from_model_json() {
        let json = r#"{"question":"Name a pet","answers":[{"answer":"Dog","points":40}]}"#;
        let set: TriviaSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.answers[0], TriviaAnswer::new("Dog".into(), 40));
    }
}
