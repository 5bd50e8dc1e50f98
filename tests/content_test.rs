//! Content adapter parsing, validation and fallbacks.

mod common;

use common::ScriptedModel;
use companion::{
    ContentAdapter, LanguageModel, LlmError, WISDOM_FALLBACK, fallback_debate, fallback_riddle,
    fallback_songs, fallback_trivia,
};
use companion_games::{MAX_FEUD_ANSWERS, Riddle};
use serde_json::json;
use std::sync::Arc;

fn adapter(model: ScriptedModel) -> (ContentAdapter, Arc<ScriptedModel>) {
    let model = Arc::new(model);
    let dyn_model: Arc<dyn LanguageModel> = model.clone();
    (ContentAdapter::new(Some(dyn_model)), model)
}

#[tokio::test]
async fn test_riddle_parsed_with_schema() {
    let (content, model) = adapter(ScriptedModel::new().with_json(Ok(json!({
        "riddle": "The more you take, the more you leave behind. What am I?",
        "answer": "Footsteps"
    }))));

    let riddle = content.riddle().await;
    assert_eq!(riddle.answer, "Footsteps");

    let schemas = model.schemas.lock().unwrap();
    assert_eq!(schemas.len(), 1);
    assert!(schemas[0].get("$schema").is_none());
    assert_eq!(schemas[0]["type"], "object");
}

#[tokio::test]
async fn test_malformed_json_falls_back() {
    let (content, _) = adapter(
        ScriptedModel::new()
            .with_json(Ok(json!({"question": "no answers field"})))
            .with_json(Ok(json!({"riddle": 42}))),
    );
    assert_eq!(content.feud_question().await, fallback_trivia());
    assert_eq!(content.riddle().await, fallback_riddle());
}

#[tokio::test]
async fn test_transport_error_falls_back() {
    let (content, _) = adapter(
        ScriptedModel::new()
            .with_json(Err(LlmError::new("timeout".to_string())))
            .with_json(Err(LlmError::new("timeout".to_string()))),
    );
    assert_eq!(content.songs("anxious").await, fallback_songs());
    assert_eq!(content.debate_turn(None, &[]).await, fallback_debate());
}

#[tokio::test]
async fn test_empty_records_fail_validation() {
    let (content, _) = adapter(
        ScriptedModel::new()
            .with_json(Ok(json!({"riddle": "  ", "answer": "x"})))
            .with_json(Ok(json!({"songs": []}))),
    );
    assert_eq!(content.riddle().await, fallback_riddle());
    assert_eq!(content.songs("happy").await, fallback_songs());
}

#[tokio::test]
async fn test_trivia_truncated_to_five() {
    let answers: Vec<_> = (1..=7)
        .map(|i| json!({"answer": format!("Answer {i}"), "points": 40 - i * 5}))
        .collect();
    let (content, _) = adapter(ScriptedModel::new().with_json(Ok(json!({
        "question": "Name something you do on a rainy day",
        "answers": answers
    }))));

    let set = content.feud_question().await;
    assert_eq!(set.answers.len(), MAX_FEUD_ANSWERS);
    assert_eq!(set.answers[0].answer, "Answer 1");
    assert_eq!(set.answers[4].answer, "Answer 5");
}

#[tokio::test]
async fn test_rebuttal_uses_generated_response() {
    let (content, _) = adapter(ScriptedModel::new().with_json(Ok(json!({
        "topic": "Cats vs dogs",
        "response": "Dogs need walks in the rain."
    }))));
    let turn = content
        .debate_turn(
            Some("Cats vs dogs"),
            &[("Let's begin.".to_string(), "Cats rule.".to_string())],
        )
        .await;
    assert_eq!(turn.response, "Dogs need walks in the rain.");
}

#[tokio::test]
async fn test_wisdom_strips_quotes_and_falls_back() {
    let (content, _) = adapter(
        ScriptedModel::new()
            .with_text(Ok("\"Small steps still move you forward.\"\n".to_string()))
            .with_text(Err(LlmError::new("quota".to_string()))),
    );
    assert_eq!(
        content.daily_wisdom().await,
        "Small steps still move you forward."
    );
    assert_eq!(content.daily_wisdom().await, WISDOM_FALLBACK);
}

#[tokio::test]
async fn test_records_deserialize_from_api_shape() {
    let riddle: Riddle = serde_json::from_value(json!({"riddle": "r", "answer": "a"})).unwrap();
    assert_eq!(riddle, Riddle::new("r".to_string(), "a".to_string()));
}
