/// LLM Client — the single point of entry for all model-provider calls in
/// ResuMind.
///
/// ARCHITECTURAL RULE: No other module may call the OpenAI API directly.
/// All chat and embedding interactions MUST go through this module.
///
/// Models are hardcoded — do not make configurable to prevent drift.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::conversation::Message;

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
/// The chat model used for both call phases of an orchestration run.
pub const CHAT_MODEL: &str = "gpt-4o-mini";
/// The embedding model backing retrieval queries. Must match the model the
/// ingestion pipeline used to embed the stored resumes.
pub const EMBEDDING_MODEL: &str = "text-embedding-3-small";
const TEMPERATURE: f32 = 0.0;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty response")]
    EmptyContent,
}

/// Provider-facing registration of an invocable tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolSpec {
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionSpec {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// Token-usage counters from the provider's response metadata.
/// Used only for cost estimation; zero when the provider omits them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

/// One model response: the assistant message (tool calls preserved
/// verbatim) plus its usage counters.
#[derive(Debug, Clone)]
pub struct ModelTurn {
    pub message: Message,
    pub usage: Usage,
}

/// The seam the orchestrator calls through. `LlmClient` is the production
/// implementation; tests script their own.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSpec]>,
    ) -> Result<ModelTurn, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSpec]>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// The single OpenAI client used by all services in ResuMind.
/// Wraps the Chat Completions and Embeddings APIs with retry logic.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// POSTs a JSON body to an API path, retrying 429 and 5xx responses
    /// with exponential backoff. Returns the successful response for the
    /// caller to deserialize.
    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, LlmError> {
        let url = format!("{OPENAI_API_URL}{path}");
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .header("content-type", "application/json")
                .json(body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                // Try to parse the provider's error envelope
                let message = serde_json::from_str::<OpenAiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Embeds a single query string for similarity search.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, LlmError> {
        let request_body = EmbeddingRequest {
            model: EMBEDDING_MODEL,
            input,
        };

        let response = self.post_json("/embeddings", &request_body).await?;
        let payload: EmbeddingResponse = response.json().await?;

        payload
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    /// Makes a chat call over the full message sequence. When `tools` is
    /// present the model may answer with tool-call requests instead of
    /// text; the returned message preserves them verbatim.
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSpec]>,
    ) -> Result<ModelTurn, LlmError> {
        let request_body = ChatCompletionRequest {
            model: CHAT_MODEL,
            temperature: TEMPERATURE,
            messages,
            tools,
        };

        let response = self.post_json("/chat/completions", &request_body).await?;
        let payload: ChatCompletionResponse = response.json().await?;

        debug!(
            "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
            payload.usage.prompt_tokens, payload.usage.completion_tokens
        );

        let choice = payload
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyContent)?;

        Ok(ModelTurn {
            message: choice.message,
            usage: payload.usage,
        })
    }
}
