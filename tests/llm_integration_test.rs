//! Live connectivity tests against the Gemini API.

use companion::{
    ChatRequest, CompanionConfig, ContentAdapter, LanguageModel, LlmClient, Persona, declarations,
};
use futures::StreamExt;
use std::sync::Arc;
use tracing::instrument;

fn live_client() -> LlmClient {
    dotenvy::dotenv().ok();
    let config = CompanionConfig::default()
        .create_llm_config()
        .expect("GEMINI_API_KEY not set");
    LlmClient::new(config)
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_gemini_text_connectivity() {
    let client = live_client();

    let response = client
        .generate_text("Say 'Hello, world!' and nothing else.")
        .await
        .expect("Failed to generate");

    assert!(!response.is_empty(), "Response should not be empty");
    eprintln!("Response: {}", response);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_gemini_streaming_chat() {
    let client = live_client();
    let request = ChatRequest {
        system_instruction: Persona::ZenCompanion.system_instruction("Spirit"),
        tools: declarations(),
        history: Vec::new(),
        message: "Hi! Say hello in five words.".to_string(),
    };

    let mut stream = client.stream_chat(request).await.expect("Failed to open stream");
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.expect("Stream failed");
        if let Some(delta) = chunk.text {
            text.push_str(&delta);
        }
    }

    assert!(!text.is_empty(), "Streamed reply should not be empty");
    eprintln!("Streamed: {}", text);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_gemini_structured_riddle() {
    let model: Arc<dyn LanguageModel> = Arc::new(live_client());
    let content = ContentAdapter::new(Some(model));

    let riddle = content.riddle().await;
    assert!(!riddle.riddle.is_empty());
    assert!(!riddle.answer.is_empty());
    eprintln!("Riddle: {} ({})", riddle.riddle, riddle.answer);
}
