//! Gemini API client: streaming chat with tools and one-shot generation.

use crate::tools::ToolDeclaration;
use async_trait::async_trait;
use derive_more::{Display, Error};
use eventsource_stream::Eventsource;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Configuration for LLM client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    api_key: String,
    model: String,
    api_base: String,
    timeout: Duration,
}

impl LlmConfig {
    /// Creates a new LLM configuration.
    #[instrument(skip(api_key), fields(model = %model))]
    pub fn new(api_key: String, model: String, api_base: String, timeout: Duration) -> Self {
        debug!("Creating LLM config");
        Self {
            api_key,
            model,
            api_base: api_base.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Gets the API key.
    #[instrument(skip(self))]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Gets the model name.
    #[instrument(skip(self))]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Gets the API base URL.
    #[instrument(skip(self))]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Gets the one-shot request timeout.
    #[instrument(skip(self))]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}",
            self.api_base, self.model, method
        )
    }
}

// ─────────────────────────────────────────────────────────────
//  Conversation types
// ─────────────────────────────────────────────────────────────

/// Speaker of a history turn, as the API names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// The person chatting.
    User,
    /// The companion.
    Model,
}

/// One committed turn of session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct ChatTurn {
    /// Who spoke.
    pub role: Role,
    /// What was said.
    pub text: String,
}

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_new::new)]
pub struct ToolCall {
    /// Function name.
    pub name: String,
    /// Arguments object.
    pub args: Value,
}

/// One streamed piece of a reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatChunk {
    /// Text fragment, if any.
    pub text: Option<String>,
    /// Function calls carried by this chunk.
    pub tool_calls: Vec<ToolCall>,
}

impl ChatChunk {
    /// A text-only chunk.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    /// A chunk carrying one function call.
    pub fn tool_call(name: impl Into<String>, args: Value) -> Self {
        Self {
            text: None,
            tool_calls: vec![ToolCall::new(name.into(), args)],
        }
    }
}

/// Everything needed to stream one chat turn.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Persona and behaviour instructions.
    pub system_instruction: String,
    /// Callable tools.
    pub tools: Vec<ToolDeclaration>,
    /// Prior committed turns.
    pub history: Vec<ChatTurn>,
    /// The new user message.
    pub message: String,
}

/// Lazily produced reply chunks.
pub type ChunkStream = BoxStream<'static, Result<ChatChunk, LlmError>>;

/// Anything that can answer the companion's requests.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Opens a streaming chat turn.
    async fn stream_chat(&self, request: ChatRequest) -> Result<ChunkStream, LlmError>;

    /// One-shot generation constrained to a JSON schema.
    async fn generate_json(&self, prompt: &str, schema: Value) -> Result<Value, LlmError>;

    /// One-shot plain text generation.
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError>;
}

// ─────────────────────────────────────────────────────────────
//  Wire format
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTools<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireTools<'a> {
    function_declarations: &'a [ToolDeclaration],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_json_schema: Value,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

impl WireContent {
    fn text(role: Option<Role>, text: &str) -> Self {
        Self {
            role: role.map(|r| r.to_string()),
            parts: vec![WirePart {
                text: Some(text.to_string()),
                function_call: None,
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<WireFunctionCall>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<WireContent>,
}

impl GenerateContentResponse {
    /// Flattens the first candidate into a chunk.
    fn into_chunk(self) -> ChatChunk {
        let mut chunk = ChatChunk::default();
        let parts = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default();

        for part in parts {
            if let Some(text) = part.text {
                chunk.text.get_or_insert_with(String::new).push_str(&text);
            }
            if let Some(call) = part.function_call {
                chunk.tool_calls.push(ToolCall::new(call.name, call.args));
            }
        }
        chunk
    }
}

#[instrument(skip(data), fields(len = data.len()))]
fn parse_event(data: &str) -> Result<ChatChunk, LlmError> {
    let response: GenerateContentResponse = serde_json::from_str(data).map_err(|e| {
        error!(error = ?e, data = %data, "Failed to parse stream event");
        LlmError::new(format!("Failed to parse stream event: {}", e))
    })?;
    Ok(response.into_chunk())
}

// ─────────────────────────────────────────────────────────────
//  Client
// ─────────────────────────────────────────────────────────────

/// Gemini REST client.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl LlmClient {
    /// Creates a new LLM client.
    #[instrument(skip(config), fields(model = %config.model()))]
    pub fn new(config: LlmConfig) -> Self {
        info!("Creating LLM client");
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Gets the configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    #[instrument(skip(self, body), fields(url = %url))]
    async fn post(
        &self,
        url: &str,
        body: &GenerateContentRequest<'_>,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, LlmError> {
        debug!("Sending request to Gemini");
        let mut request = self
            .http
            .post(url)
            .header("x-goog-api-key", self.config.api_key.clone())
            .json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = ?e, "Gemini API request failed");
            LlmError::new(format!("Gemini API request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(status = %status, response = %text, "Gemini API error");
            return Err(LlmError::new(format!("Gemini API error {}: {}", status, text)));
        }
        Ok(response)
    }

    #[instrument(skip(self, body))]
    async fn generate(&self, body: &GenerateContentRequest<'_>) -> Result<String, LlmError> {
        let url = self.config.endpoint("generateContent");
        let response = self.post(&url, body, Some(self.config.timeout)).await?;

        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read Gemini response");
            LlmError::new(format!("Failed to read response: {}", e))
        })?;

        let parsed: GenerateContentResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                error!(error = ?e, response = %response_text, "Failed to parse Gemini response");
                LlmError::new(format!("Failed to parse response: {}", e))
            })?;

        let content = parsed.into_chunk().text.ok_or_else(|| {
            error!(response = %response_text, "No text content in Gemini response");
            LlmError::new("No text content in Gemini response".to_string())
        })?;

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }
}

#[async_trait]
impl LanguageModel for LlmClient {
    #[instrument(skip(self, request), fields(model = %self.config.model, history = request.history.len()))]
    async fn stream_chat(&self, request: ChatRequest) -> Result<ChunkStream, LlmError> {
        let mut contents: Vec<WireContent> = request
            .history
            .iter()
            .map(|turn| WireContent::text(Some(turn.role), &turn.text))
            .collect();
        contents.push(WireContent::text(Some(Role::User), &request.message));

        let body = GenerateContentRequest {
            system_instruction: Some(WireContent::text(None, &request.system_instruction)),
            contents,
            tools: vec![WireTools {
                function_declarations: &request.tools,
            }],
            generation_config: None,
        };

        let url = format!("{}?alt=sse", self.config.endpoint("streamGenerateContent"));
        let response = self.post(&url, &body, None).await?;
        info!("Chat stream opened");

        let stream = response
            .bytes_stream()
            .eventsource()
            .filter_map(|event| async move {
                match event {
                    Ok(event) if event.data.trim().is_empty() => None,
                    Ok(event) => Some(parse_event(&event.data)),
                    Err(e) => Some(Err(LlmError::new(format!("Stream error: {}", e)))),
                }
            })
            .boxed();
        Ok(stream)
    }

    #[instrument(skip(self, prompt, schema), fields(model = %self.config.model))]
    async fn generate_json(&self, prompt: &str, schema: Value) -> Result<Value, LlmError> {
        let body = GenerateContentRequest {
            system_instruction: None,
            contents: vec![WireContent::text(Some(Role::User), prompt)],
            tools: Vec::new(),
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
                response_json_schema: schema,
            }),
        };
        let text = self.generate(&body).await?;
        serde_json::from_str(text.trim()).map_err(|e| {
            error!(error = ?e, text = %text, "Response is not valid JSON");
            LlmError::new(format!("Response is not valid JSON: {}", e))
        })
    }

    #[instrument(skip(self, prompt), fields(model = %self.config.model))]
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        let body = GenerateContentRequest {
            system_instruction: None,
            contents: vec![WireContent::text(Some(Role::User), prompt)],
            tools: Vec::new(),
            generation_config: None,
        };
        self.generate(&body).await
    }
}

/// LLM client error.
#[derive(Debug, Clone, Display, Error)]
#[display("LLM error: {} at {}:{}", message, file, line)]
pub struct LlmError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LlmError {
    /// Creates a new LLM error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "LLM error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_with_text_and_call_flattens() {
        let data = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Let's play. "},
                        {"functionCall": {"name": "playGame", "args": {"gameType": "memory"}}}
                    ]
                }
            }]
        })
        .to_string();

        let chunk = parse_event(&data).unwrap();
        assert_eq!(chunk.text.as_deref(), Some("Let's play. "));
        assert_eq!(chunk.tool_calls.len(), 1);
        assert_eq!(chunk.tool_calls[0].name, "playGame");
        assert_eq!(chunk.tool_calls[0].args["gameType"], "memory");
    }

    #[test]
    fn event_without_candidates_is_empty_chunk() {
        let chunk = parse_event(r#"{"usageMetadata": {"totalTokenCount": 3}}"#).unwrap();
        assert_eq!(chunk, ChatChunk::default());
    }

    #[test]
    fn malformed_event_is_error() {
        assert!(parse_event("{not json").is_err());
    }

    #[test]
    fn request_body_uses_api_field_names() {
        let tools = crate::tools::declarations();
        let body = GenerateContentRequest {
            system_instruction: Some(WireContent::text(None, "be kind")),
            contents: vec![
                WireContent::text(Some(Role::User), "hi"),
                WireContent::text(Some(Role::Model), "hello"),
            ],
            tools: vec![WireTools {
                function_declarations: &tools,
            }],
            generation_config: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be kind");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(value["contents"][1]["role"], "model");
        assert_eq!(
            value["tools"][0]["functionDeclarations"][0]["name"],
            "playGame"
        );
        assert!(value.get("generationConfig").is_none());
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let config = LlmConfig::new(
            "key".into(),
            "gemini-2.5-flash".into(),
            "http://localhost:8080/".into(),
            Duration::from_secs(5),
        );
        assert_eq!(
            config.endpoint("generateContent"),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
